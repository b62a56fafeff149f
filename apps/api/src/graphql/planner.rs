//! Eager-fetch planning for root collections
//!
//! Before the rows of a root list are resolved, the planner looks at which
//! relations the client selected on them. Relations on the whitelist are
//! fetched together with the rows in the same storage round trip; anything
//! else is left to the loaders. Unknown field names always fall back to lazy
//! loading.

use crate::models::UserInclude;

use super::selection::SelectionNode;

/// User relation fields that can be joined into the root `users` query
const USER_SUBSCRIBED_TO: &str = "userSubscribedTo";
const USER_SUBSCRIBERS: &str = "subscribedToUser";

/// Decide which subscription relations to fetch with the root `users` list
pub fn plan_users(selection: &SelectionNode) -> UserInclude {
    let include = UserInclude {
        subscribed_to: selection.has_child(USER_SUBSCRIBED_TO),
        subscribers: selection.has_child(USER_SUBSCRIBERS),
    };
    tracing::debug!(
        subscribed_to = include.subscribed_to,
        subscribers = include.subscribers,
        "Planned users query"
    );
    include
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn users(children: &[&str]) -> SelectionNode {
        SelectionNode::new(
            "users",
            children
                .iter()
                .map(|name| SelectionNode::new(*name, vec![SelectionNode::leaf("id")]))
                .collect(),
        )
    }

    #[rstest]
    #[case(&[], false, false)]
    #[case(&["userSubscribedTo"], true, false)]
    #[case(&["subscribedToUser"], false, true)]
    #[case(&["userSubscribedTo", "subscribedToUser"], true, true)]
    #[case(&["posts", "profile"], false, false)]
    fn test_plan_users(
        #[case] children: &[&str],
        #[case] subscribed_to: bool,
        #[case] subscribers: bool,
    ) {
        let include = plan_users(&users(children));

        assert_eq!(
            include,
            UserInclude {
                subscribed_to,
                subscribers
            }
        );
    }

    #[test]
    fn test_only_direct_children_count() {
        let selection = SelectionNode::new(
            "users",
            vec![SelectionNode::new(
                "posts",
                vec![SelectionNode::leaf("userSubscribedTo")],
            )],
        );

        assert!(!plan_users(&selection).any());
    }
}

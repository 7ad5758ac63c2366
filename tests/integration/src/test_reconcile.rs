//! Reconciler integration tests against a running server.

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::{TOPIC_ARN, cleanup_bus, create_test_bus, events_client, reconciler, test_name};

    /// Helper: fetch the rule's event pattern, or `None` if the rule is gone.
    async fn rule_pattern(
        client: &aws_sdk_eventbridge::Client,
        bus: &str,
        rule: &str,
    ) -> Option<Value> {
        let output = client
            .describe_rule()
            .name(rule)
            .event_bus_name(bus)
            .send()
            .await
            .ok()?;
        let pattern = output.event_pattern().expect("rule should have a pattern");
        Some(serde_json::from_str(pattern).expect("pattern should be JSON"))
    }

    /// Helper: list `(id, arn)` of the rule's targets.
    async fn rule_targets(
        client: &aws_sdk_eventbridge::Client,
        bus: &str,
        rule: &str,
    ) -> Vec<(String, String)> {
        client
            .list_targets_by_rule()
            .rule(rule)
            .event_bus_name(bus)
            .send()
            .await
            .expect("list targets")
            .targets()
            .iter()
            .map(|t| (t.id().to_owned(), t.arn().to_owned()))
            .collect()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_rule_for_every_account() {
        let client = events_client();
        let bus = create_test_bus(&client, "create").await;
        let rule = test_name("rule");
        let reconciler = reconciler(
            &client,
            &bus,
            &rule,
            &["111111111111", "222222222222", "333333333333"],
        );

        let response = reconciler
            .handle(&json!({ "RequestType": "Create" }))
            .await
            .expect("create should succeed");

        let pattern = rule_pattern(&client, &bus, &rule).await.expect("rule exists");
        assert_eq!(
            pattern["account"],
            json!(["111111111111", "222222222222", "333333333333"])
        );
        assert_eq!(
            pattern["source"],
            json!(["aws.cloudwatch", "aws.config", "aws.guardduty"])
        );
        assert_eq!(
            rule_targets(&client, &bus, &rule).await,
            vec![(format!("snsTarget-{rule}"), TOPIC_ARN.to_owned())]
        );
        assert_eq!(response.physical_resource_id.as_deref(), Some(rule.as_str()));

        cleanup_bus(&client, &bus).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_remove_rule_after_update() {
        let client = events_client();
        let bus = create_test_bus(&client, "update").await;
        let rule = test_name("rule");
        let reconciler = reconciler(&client, &bus, &rule, &["111111111111", "222222222222"]);

        reconciler
            .handle(&json!({ "RequestType": "Update", "PhysicalResourceId": rule }))
            .await
            .expect("update should succeed");

        assert!(rule_pattern(&client, &bus, &rule).await.is_none());

        cleanup_bus(&client, &bus).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_rule_repeatedly() {
        let client = events_client();
        let bus = create_test_bus(&client, "delete").await;
        let rule = test_name("rule");
        let reconciler = reconciler(&client, &bus, &rule, &["111111111111"]);

        reconciler
            .handle(&json!({ "RequestType": "Create" }))
            .await
            .expect("create should succeed");
        for _ in 0..2 {
            reconciler
                .handle(&json!({ "RequestType": "Delete", "PhysicalResourceId": rule }))
                .await
                .expect("delete should be idempotent");
        }

        assert!(rule_pattern(&client, &bus, &rule).await.is_none());

        cleanup_bus(&client, &bus).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refresh_rule_on_membership_change() {
        let client = events_client();
        let bus = create_test_bus(&client, "member").await;
        let rule = test_name("rule");

        reconciler(&client, &bus, &rule, &["111111111111", "222222222222"])
            .handle(&json!({ "RequestType": "Create" }))
            .await
            .expect("create should succeed");

        reconciler(&client, &bus, &rule, &["222222222222"])
            .handle(&json!({
                "source": "aws.organizations",
                "detail-type": "AWS API Call via CloudTrail",
                "detail": { "eventName": "MoveAccount" },
            }))
            .await
            .expect("membership change should succeed");

        let pattern = rule_pattern(&client, &bus, &rule).await.expect("rule exists");
        assert_eq!(pattern["account"], json!(["222222222222"]));
        assert_eq!(rule_targets(&client, &bus, &rule).await.len(), 1);

        cleanup_bus(&client, &bus).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_not_create_rule_for_empty_unit() {
        let client = events_client();
        let bus = create_test_bus(&client, "empty").await;
        let rule = test_name("rule");

        reconciler(&client, &bus, &rule, &[])
            .handle(&json!({ "detail": { "eventName": "RemoveAccountFromOrganization" } }))
            .await
            .expect("empty unit should succeed");

        assert!(rule_pattern(&client, &bus, &rule).await.is_none());

        cleanup_bus(&client, &bus).await;
    }
}

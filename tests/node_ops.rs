// ABOUTME: Integration tests for the node and service operations.
// ABOUTME: Exercises validation, status updates and the drain waiter against an in-memory cluster.

mod support;

use std::time::Duration;

use noderoll::backend::{AccessError, NodeStatus, ServiceSummary};
use noderoll::error::ErrorKind;
use noderoll::fleet::{FleetError, PollPolicy, ValidationError};
use noderoll::ops;
use noderoll::types::{ClusterName, NodeId};
use support::{DrainBehaviour, FakeCluster, Op};
use tokio_util::sync::CancellationToken;

fn cluster() -> ClusterName {
    ClusterName::new("demo").unwrap()
}

fn policy(interval: u64, deadline: u64) -> PollPolicy {
    PollPolicy::new(Duration::from_secs(interval), Duration::from_secs(deadline)).unwrap()
}

mod update_status {
    use super::*;

    #[tokio::test]
    async fn empty_id_list_makes_no_remote_call() {
        let fake = FakeCluster::new(2, 2, 1, 4);

        let err = ops::update_node_status(&fake, &cluster(), &[], &NodeStatus::Draining)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FleetError::Validation(ValidationError::EmptyNodeList)
        ));
        fake.calls(|calls| assert_eq!(calls.remote_calls(), 0));
    }

    #[tokio::test]
    async fn status_outside_active_and_draining_makes_no_remote_call() {
        let fake = FakeCluster::new(2, 2, 1, 4);
        let ids = fake.node_ids();

        for status in ["INACTIVE", "REGISTERING", "bogus"] {
            let err = ops::update_node_status(&fake, &cluster(), &ids, &NodeStatus::parse(status))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        fake.calls(|calls| assert_eq!(calls.remote_calls(), 0));
    }

    #[tokio::test]
    async fn reactivating_a_draining_node_sends_one_request() {
        let fake = FakeCluster::new(2, 2, 1, 4);
        let ids = fake.node_ids();

        ops::update_node_status(&fake, &cluster(), &ids[..1], &NodeStatus::Draining)
            .await
            .unwrap();
        ops::update_node_status(&fake, &cluster(), &ids[..1], &NodeStatus::parse("active"))
            .await
            .unwrap();

        fake.calls(|calls| {
            assert_eq!(calls.status_updates.len(), 2);
            assert_eq!(calls.status_updates[1].1, NodeStatus::Active);
        });
        assert_eq!(fake.nodes()[0].status, NodeStatus::Active);
    }

    #[tokio::test]
    async fn access_errors_pass_through() {
        let fake = FakeCluster::new(1, 1, 0, 2)
            .failing(Op::UpdateStatus, || AccessError::Auth("expired token".to_string()));
        let ids = fake.node_ids();

        let err = ops::update_node_status(&fake, &cluster(), &ids, &NodeStatus::Draining)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Access);
        assert!(err.to_string().contains("expired token"));
    }
}

mod drain {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn without_wait_returns_after_the_request() {
        let fake = FakeCluster::new(2, 2, 1, 4).with_drain(DrainBehaviour::Never);
        let ids = fake.node_ids();

        let report = ops::drain_nodes(&fake, &cluster(), &ids, None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.is_none());
        fake.calls(|calls| {
            assert_eq!(calls.status_updates.len(), 1);
            assert_eq!(calls.list_nodes, 0);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_once_tasks_have_moved() {
        let fake = FakeCluster::new(3, 3, 1, 6).with_drain(DrainBehaviour::AfterPolls(3));
        let ids = fake.node_ids();

        let report = ops::drain_nodes(
            &fake,
            &cluster(),
            &ids,
            Some(policy(5, 600)),
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(report.polls, 3);
        assert_eq!(report.elapsed, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn never_draining_node_times_out_after_six_polls() {
        let fake = FakeCluster::new(1, 1, 0, 2).with_drain(DrainBehaviour::Never);
        let ids = fake.node_ids();

        let err = ops::drain_nodes(
            &fake,
            &cluster(),
            &ids,
            Some(policy(5, 30)),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            FleetError::Timeout {
                polls: 6,
                elapsed,
                ..
            } if elapsed == Duration::from_secs(30)
        ));
        fake.calls(|calls| assert_eq!(calls.list_nodes, 6));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling_within_one_interval() {
        let fake = FakeCluster::new(1, 1, 0, 2).with_drain(DrainBehaviour::Never);
        let ids = fake.node_ids();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let err = ops::drain_nodes(&fake, &cluster(), &ids, Some(policy(5, 600)), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, FleetError::Cancelled));
        assert_eq!(start.elapsed(), Duration::from_secs(7));
        // polls at 0s and 5s, none after the cancel
        fake.calls(|calls| assert_eq!(calls.list_nodes, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn nodes_that_leave_the_cluster_count_as_drained() {
        let fake = FakeCluster::new(1, 1, 0, 2).with_drain(DrainBehaviour::Never);

        let report = ops::drain_nodes(
            &fake,
            &cluster(),
            &[NodeId::new("gone-node")],
            Some(policy(5, 30)),
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(report.polls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn registry_failure_during_wait_is_an_access_error() {
        let fake = FakeCluster::new(1, 1, 0, 2)
            .with_drain(DrainBehaviour::Never)
            .failing(Op::ListNodes, || AccessError::Throttled("Rate exceeded".to_string()));
        let ids = fake.node_ids();

        let err = ops::drain_nodes(
            &fake,
            &cluster(),
            &ids,
            Some(policy(5, 30)),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Access);
        // the drain request itself went out
        fake.calls(|calls| assert_eq!(calls.status_updates.len(), 1));
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn empty_cluster_lists_no_nodes() {
        let fake = FakeCluster::empty();
        assert!(ops::list_nodes(&fake, &cluster()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn services_are_returned_as_listed() {
        let fake = FakeCluster::new(1, 1, 0, 2).with_services(vec![ServiceSummary {
            name: "web".to_string(),
            status: "ACTIVE".to_string(),
            desired: 2,
            running: 2,
            pending: 0,
            task_definition: "arn:aws:ecs:eu-west-1:1:task-definition/web:7".to_string(),
            launch_type: Some("EC2".to_string()),
        }]);

        let services = ops::list_services(&fake, &cluster()).await.unwrap();

        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "web");
    }
}

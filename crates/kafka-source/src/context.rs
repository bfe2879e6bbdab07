use console_types::{Notification, TopicPartition};
use rdkafka::consumer::{BaseConsumer, ConsumerContext, Rebalance};
use rdkafka::{ClientContext, TopicPartitionList};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Consumer context that turns rebalances into [`Notification`]s.
///
/// rdkafka calls the rebalance hooks from inside `recv`, so the notification
/// is sent without waiting.
pub struct RebalanceContext {
    notifications: UnboundedSender<Notification>,
}

impl RebalanceContext {
    pub fn new(notifications: UnboundedSender<Notification>) -> Self {
        Self { notifications }
    }

    fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            debug!("Rebalance notification dropped, dispatch loop has stopped");
        }
    }
}

impl ClientContext for RebalanceContext {}

impl ConsumerContext for RebalanceContext {
    fn post_rebalance(&self, _consumer: &BaseConsumer<Self>, rebalance: &Rebalance<'_>) {
        self.notify(notification(rebalance));
    }
}

fn notification(rebalance: &Rebalance<'_>) -> Notification {
    match rebalance {
        Rebalance::Assign(tpl) => Notification::Assigned(partitions(tpl)),
        Rebalance::Revoke(tpl) => Notification::Revoked(partitions(tpl)),
        Rebalance::Error(e) => Notification::Failed(e.to_string()),
    }
}

fn partitions(tpl: &TopicPartitionList) -> Vec<TopicPartition> {
    tpl.elements()
        .iter()
        .map(|element| TopicPartition {
            topic: element.topic().to_string(),
            partition: element.partition(),
        })
        .collect()
}

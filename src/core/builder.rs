use std::sync::Arc;

use crate::{
    config::Config,
    error::ConfigError,
    subscribers::{Ledger, Subscribe},
};

use super::coordinator::Coordinator;

/// Builder for constructing a [`Coordinator`].
pub struct CoordinatorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers, replacing any added so far.
    ///
    /// Subscribers receive every dinner event through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the configuration and lays the table.
    ///
    /// A [`Ledger`] is always installed next to the given subscribers.
    pub fn build(mut self) -> Result<Coordinator, ConfigError> {
        self.cfg.validate()?;
        let ledger = Arc::new(Ledger::new());
        self.subscribers.push(ledger.clone());
        Ok(Coordinator::new_internal(self.cfg, self.subscribers, ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected_before_anything_exists() {
        let mut cfg = Config::with_philosophers(3);
        cfg.chopsticks = 1;
        let err = CoordinatorBuilder::new(cfg).build().err();
        assert_eq!(err, Some(ConfigError::TooFewChopsticks { got: 1 }));
    }

    #[test]
    fn table_follows_config() {
        let mut cfg = Config::with_philosophers(7);
        cfg.seats = 4;
        cfg.chopsticks = 6;
        let coord = CoordinatorBuilder::new(cfg).build().unwrap();
        assert_eq!(coord.table().seats().capacity(), 4);
        assert_eq!(coord.table().chopsticks().capacity(), 6);
        assert_eq!(coord.config().philosophers, 7);
    }
}

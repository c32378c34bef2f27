use sqlx::PgConnection;

/// A handle to an active database connection which can be borrowed for queries
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// The set of clients the application uses to communicate with external systems.
/// Driven adapters accept an implementation of this trait so business logic stays
/// agnostic of where the data actually lives.
pub trait ExternalConnectivity: Sync {
    type DbHandle<'handle>: ConnectionHandle + Send
    where
        Self: 'handle;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// Implementors can open a transactional variant of themselves whose writes only
/// become visible once [TransactionHandle::commit] is invoked
pub trait Transactable: Sync {
    type Handle: ExternalConnectivity + TransactionHandle + Send;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// A set of external connections with an active database transaction
pub trait TransactionHandle {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

/// Convenience trait for operations which may or may not open a transaction
/// over the same set of connections
pub trait TransactableExternalConnectivity: ExternalConnectivity + Transactable {}
impl<T: ExternalConnectivity + Transactable> TransactableExternalConnectivity for T {}

#[cfg(test)]
pub mod test_util {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Connectivity stand-in for domain and API tests. The in-memory driven port
    /// fakes never touch a real database, so the handle it produces panics if a
    /// test accidentally tries to borrow a connection.
    #[derive(Clone)]
    pub struct FakeExternalConnectivity {
        is_transacting: bool,
        downstream_transaction_committed: Arc<AtomicBool>,
    }

    impl FakeExternalConnectivity {
        pub fn new() -> Self {
            Self {
                is_transacting: false,
                downstream_transaction_committed: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn is_transacting(&self) -> bool {
            self.is_transacting
        }

        pub fn transaction_committed(&self) -> bool {
            self.downstream_transaction_committed.load(Ordering::SeqCst)
        }
    }

    pub struct MockDatabaseHandle;

    impl ConnectionHandle for MockDatabaseHandle {
        fn borrow_connection(&mut self) -> &mut PgConnection {
            panic!("Tried to acquire a real database connection in a test")
        }
    }

    impl ExternalConnectivity for FakeExternalConnectivity {
        type DbHandle<'handle> = MockDatabaseHandle;

        async fn database_cxn(&mut self) -> Result<MockDatabaseHandle, anyhow::Error> {
            Ok(MockDatabaseHandle)
        }
    }

    impl Transactable for FakeExternalConnectivity {
        type Handle = FakeExternalConnectivity;

        async fn start_transaction(&self) -> Result<FakeExternalConnectivity, anyhow::Error> {
            Ok(FakeExternalConnectivity {
                is_transacting: true,
                downstream_transaction_committed: Arc::clone(
                    &self.downstream_transaction_committed,
                ),
            })
        }
    }

    impl TransactionHandle for FakeExternalConnectivity {
        async fn commit(self) -> Result<(), anyhow::Error> {
            if !self.is_transacting {
                panic!("Tried to commit when no transaction was active");
            }

            self.downstream_transaction_committed
                .store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}

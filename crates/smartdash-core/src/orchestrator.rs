// ── Async operation orchestrator ──
//
// Wraps one gateway call in the pending / fulfilled / rejected
// transitions of a container family. No deduplication and no sequence
// guard: whichever call settles last writes last.

use std::future::Future;

use tracing::debug;

use crate::error::CoreError;
use crate::state::{Action, Lifecycle, Rejection};
use crate::store::Store;

/// Run `request` under the lifecycle of `family`.
///
/// Dispatches `Pending` before the request is polled, then exactly one of
/// `Fulfilled` or `Rejected`. The settled payload or error is returned to
/// the caller as well.
pub async fn settle<T, A, Fut>(
    store: &Store,
    family: impl Fn(Lifecycle<T>) -> A,
    request: Fut,
) -> Result<T, CoreError>
where
    T: Clone,
    A: Into<Action>,
    Fut: Future<Output = Result<T, smartdash_api::Error>>,
{
    store.dispatch(family(Lifecycle::Pending));

    match request.await {
        Ok(payload) => {
            store.dispatch(family(Lifecycle::Fulfilled(payload.clone())));
            Ok(payload)
        }
        Err(err) => {
            let err = CoreError::from(err);
            debug!(error = %err, "request rejected");
            store.dispatch(family(Lifecycle::Rejected(Rejection::from(&err))));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use tokio::sync::oneshot;

    use super::*;
    use crate::model::{Device, DeviceId};
    use crate::session::MemorySessionStore;
    use crate::state::DeviceEvent;

    fn device(id: i64) -> Device {
        Device {
            id: DeviceId(id),
            name: format!("device-{id}"),
            device_type: None,
            location: None,
            status: None,
            online: None,
            last_seen: None,
            latitude: None,
            longitude: None,
            alerts_count: None,
        }
    }

    fn store() -> Arc<Store> {
        Arc::new(Store::new(Arc::new(MemorySessionStore::new())))
    }

    fn ids(store: &Store) -> Vec<i64> {
        store.devices().devices.iter().map(|d| d.id.0).collect()
    }

    #[tokio::test]
    async fn fulfilled_payload_reaches_state_and_caller() {
        let store = store();
        let result = settle(&store, DeviceEvent::Fetch, async {
            Ok::<_, smartdash_api::Error>(vec![device(1)])
        })
        .await
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(ids(&store), vec![1]);
        assert!(!store.devices().status.loading);
    }

    #[tokio::test]
    async fn rejection_sets_error_and_returns_it() {
        let store = store();
        let err = settle(&store, DeviceEvent::Fetch, async {
            Err::<Vec<Device>, _>(smartdash_api::Error::Rejected {
                status: 500,
                message: Some("Database unavailable".into()),
                body: String::new(),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::Api { .. }));
        let status = store.devices().status;
        assert!(!status.loading);
        assert_eq!(status.error.as_deref(), Some("Database unavailable"));
    }

    #[tokio::test]
    async fn pending_is_visible_while_in_flight() {
        let store = store();
        let (tx, rx) = oneshot::channel::<Vec<Device>>();

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move {
                let reply = async move { Ok::<_, smartdash_api::Error>(rx.await.unwrap()) };
                settle(&store, DeviceEvent::Fetch, reply).await
            }
        });

        let mut devices = store.subscribe_devices();
        devices.wait_for(|s| s.status.loading).await.unwrap();

        tx.send(vec![device(1)]).unwrap();
        task.await.unwrap().unwrap();
        assert!(!store.devices().status.loading);
    }

    #[tokio::test]
    async fn last_settlement_wins_not_last_issued() {
        let store = store();
        let (tx_a, rx_a) = oneshot::channel::<Vec<Device>>();
        let (tx_b, rx_b) = oneshot::channel::<Vec<Device>>();

        let fetch_a = tokio::spawn({
            let store = Arc::clone(&store);
            async move {
                let reply = async move { Ok::<_, smartdash_api::Error>(rx_a.await.unwrap()) };
                settle(&store, DeviceEvent::Fetch, reply).await
            }
        });
        tokio::task::yield_now().await;
        let fetch_b = tokio::spawn({
            let store = Arc::clone(&store);
            async move {
                let reply = async move { Ok::<_, smartdash_api::Error>(rx_b.await.unwrap()) };
                settle(&store, DeviceEvent::Fetch, reply).await
            }
        });
        tokio::task::yield_now().await;

        tx_b.send(vec![device(2)]).unwrap();
        fetch_b.await.unwrap().unwrap();
        assert_eq!(ids(&store), vec![2]);

        tx_a.send(vec![device(1)]).unwrap();
        fetch_a.await.unwrap().unwrap();
        assert_eq!(ids(&store), vec![1]);
    }
}

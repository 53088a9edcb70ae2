use crate::core::{AccountGraph, AccountStore, Resolution};
use crate::utils::error::Result;

pub const INVOICE_WINDOW: usize = 5;
pub const CONSUMPTION_WINDOW: usize = 5;
pub const SERVICE_REQUEST_WINDOW: usize = 3;

/// Builds the account graph for a resolution.
///
/// An unresolved identifier yields an empty graph, not an error. For a resolved
/// triple the three history reads run concurrently and are all driven to
/// completion; the first failure, in invoice/consumption/request order, is
/// returned. The reads are not a single snapshot.
pub async fn aggregate<S>(store: &S, resolution: Resolution) -> Result<AccountGraph>
where
    S: AccountStore + ?Sized,
{
    let triple = match resolution {
        Resolution::Resolved(triple) => triple,
        Resolution::Unresolved(reason) => {
            tracing::debug!("Nothing to aggregate: {:?}", reason);
            return Ok(AccountGraph::empty());
        }
    };

    let (invoices, readings, requests) = tokio::join!(
        store.recent_invoices(triple.contract.id, INVOICE_WINDOW),
        store.recent_consumption(triple.meter.id, CONSUMPTION_WINDOW),
        store.recent_service_requests(triple.client.id, SERVICE_REQUEST_WINDOW)
    );
    let (invoices, readings, requests) = (invoices?, readings?, requests?);

    tracing::debug!(
        "Aggregated client {}: {} invoices, {} readings, {} requests",
        triple.client.id,
        invoices.len(),
        readings.len(),
        requests.len()
    );

    Ok(AccountGraph::from_parts(triple, invoices, readings, requests))
}

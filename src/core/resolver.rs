use crate::core::{AccountStore, AccountTriple, Resolution, UnresolvedReason};
use crate::domain::ports::MeterLink;
use crate::utils::error::Result;

/// Maps a raw identifier to one client/contract/meter triple.
///
/// Strategies are tried in a fixed order and the first match wins:
/// 1. the identifier as a meter number (join read of meter, contract, client);
/// 2. if it is all ASCII digits, as a client id, following the client's most
///    recent active contract and that contract's most recent meter.
///
/// Anything else is unresolved. Store failures propagate unchanged.
pub async fn resolve<S>(store: &S, identifier: &str) -> Result<Resolution>
where
    S: AccountStore + ?Sized,
{
    let identifier = identifier.trim();
    // Blank input never reaches the store.
    if identifier.is_empty() {
        return Ok(Resolution::Unresolved(UnresolvedReason::EmptyIdentifier));
    }

    tracing::debug!("Resolving identifier '{}' as meter number", identifier);
    if let Some(link) = store.find_meter_by_number(identifier).await? {
        return Ok(from_meter_link(identifier, link));
    }

    if !is_numeric_id(identifier) {
        return Ok(Resolution::Unresolved(UnresolvedReason::NoMatchingMeter));
    }

    // Too many digits for an id column means no such client.
    let Ok(client_id) = identifier.parse::<i64>() else {
        return Ok(Resolution::Unresolved(UnresolvedReason::ClientNotFound));
    };

    tracing::debug!("Resolving identifier '{}' as client id", identifier);
    // Client id path: client, then its newest active contract, then that contract's newest meter.
    let Some(client) = store.find_client(client_id).await? else {
        return Ok(Resolution::Unresolved(UnresolvedReason::ClientNotFound));
    };

    let Some(contract) = store.find_active_contract(client.id).await? else {
        tracing::info!("Client {} has no active contract", client.id);
        return Ok(Resolution::Unresolved(UnresolvedReason::NoActiveContract));
    };

    let Some(meter) = store.find_meter_for_contract(contract.id).await? else {
        tracing::info!("Contract {} has no meter", contract.id);
        return Ok(Resolution::Unresolved(UnresolvedReason::NoMeter));
    };

    Ok(Resolution::Resolved(AccountTriple {
        client,
        contract,
        meter,
    }))
}

/// A meter match only resolves when both of its links are present.
fn from_meter_link(identifier: &str, link: MeterLink) -> Resolution {
    match (link.contract, link.client) {
        (Some(contract), Some(client)) => Resolution::Resolved(AccountTriple {
            client,
            contract,
            meter: link.meter,
        }),
        _ => {
            tracing::warn!(
                "Meter '{}' (id {}) is missing its contract or client link",
                identifier,
                link.meter.id
            );
            Resolution::Unresolved(UnresolvedReason::BrokenMeterLink)
        }
    }
}

/// ASCII digits only; signs and whitespace are not ids.
fn is_numeric_id(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

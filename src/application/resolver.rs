use crate::domain::cost::{Cost, CostQuote, CostRecord};
use crate::domain::country::CountryLookupResult;
use crate::domain::pan;
use crate::domain::ports::{CostStoreRef, CountryLookupRef};
use crate::error::{CardCostError, LookupError, Result};
use std::time::Duration;

/// Computes the clearing cost of a card from its issuing country.
///
/// Every call validates the PAN, asks the lookup service for the country and
/// reads the matching cost record. Countries without a stored record get the
/// default cost; that record is built in memory and never saved.
pub struct ClearingCostResolver {
    cost_store: CostStoreRef,
    country_lookup: CountryLookupRef,
    lookup_timeout: Option<Duration>,
}

impl ClearingCostResolver {
    /// Creates a resolver over the given store and lookup service.
    ///
    /// No lookup timeout is imposed beyond whatever the lookup service applies
    /// itself; see [`ClearingCostResolver::with_lookup_timeout`].
    pub fn new(cost_store: CostStoreRef, country_lookup: CountryLookupRef) -> Self {
        Self {
            cost_store,
            country_lookup,
            lookup_timeout: None,
        }
    }

    /// Bounds each country lookup; an expired lookup fails with `LookupError::Timeout`.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    /// Returns the clearing cost for `pan`.
    pub async fn resolve_cost(&self, pan: &str) -> Result<Cost> {
        Ok(self.quote(pan).await?.cost)
    }

    /// Resolves cost and country for `pan`, reporting whether the default was applied.
    pub async fn quote(&self, pan: &str) -> Result<CostQuote> {
        if !pan::is_valid(pan) {
            return Err(CardCostError::InvalidInput);
        }

        let country = self.lookup_country(pan).await?.alpha2;

        let (record, fallback) = match self.cost_store.find_by_country_code(&country).await? {
            Some(record) => (record, false),
            None => {
                tracing::debug!(country = %country, "no stored clearing cost, applying default");
                (CostRecord::fallback(country), true)
            }
        };

        Ok(CostQuote {
            country: record.country_code,
            cost: record.cost,
            fallback,
        })
    }

    /// Asks the lookup service for the issuing country of `pan`.
    ///
    /// Performs no PAN validation.
    pub async fn lookup_country(&self, pan: &str) -> Result<CountryLookupResult> {
        let lookup = self.country_lookup.lookup(pan);
        let result = match self.lookup_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, lookup).await {
                Ok(result) => result,
                Err(_) => Err(LookupError::Timeout),
            },
            None => lookup.await,
        };
        result.map_err(|e| {
            tracing::warn!(card = %pan::mask_pan(pan), error = %e, "country lookup failed");
            CardCostError::LookupFailure(e)
        })
    }
}

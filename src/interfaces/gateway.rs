use crate::application::admission::AdmissionController;
use crate::application::resolver::ClearingCostResolver;
use crate::domain::cost::CostQuote;
use crate::domain::country::CountryLookupResult;
use crate::domain::pan::mask_pan;
use crate::error::{CardCostError, ErrorKind, Result};
use governor::clock::{Clock, DefaultClock};
use std::sync::Arc;

/// Request boundary for the cost endpoint.
///
/// Every call first asks the admission controller for a token; a rejected
/// request never reaches the resolver. Tokens are not refunded when the
/// request later fails or is cancelled.
pub struct CostGateway<C: Clock = DefaultClock> {
    admission: Arc<AdmissionController<C>>,
    resolver: Arc<ClearingCostResolver>,
}

impl<C: Clock> Clone for CostGateway<C> {
    fn clone(&self) -> Self {
        Self {
            admission: Arc::clone(&self.admission),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<C: Clock> CostGateway<C> {
    /// Creates a new `CostGateway`.
    ///
    /// # Arguments
    ///
    /// * `admission` - The shared token bucket.
    /// * `resolver` - The resolver admitted requests are forwarded to.
    pub fn new(admission: Arc<AdmissionController<C>>, resolver: Arc<ClearingCostResolver>) -> Self {
        Self {
            admission,
            resolver,
        }
    }

    /// Admits the request, then resolves the clearing cost of `pan`.
    ///
    /// Fails with `NotAdmitted` when the bucket is empty, otherwise with whatever
    /// the resolver reports.
    pub async fn quote(&self, pan: &str) -> Result<CostQuote> {
        self.admit(pan)?;
        let quote = self.resolver.quote(pan).await?;
        tracing::info!(
            card = %mask_pan(pan),
            country = %quote.country,
            cost = %quote.cost,
            fallback = quote.fallback,
            "clearing cost calculated"
        );
        Ok(quote)
    }

    /// Admits the request, then looks up the issuing country of `pan`.
    ///
    /// The PAN is not validated.
    pub async fn country(&self, pan: &str) -> Result<CountryLookupResult> {
        self.admit(pan)?;
        self.resolver.lookup_country(pan).await
    }

    fn admit(&self, pan: &str) -> Result<()> {
        if self.admission.try_acquire() {
            Ok(())
        } else {
            tracing::warn!(card = %mask_pan(pan), "request rejected by admission control");
            Err(CardCostError::NotAdmitted)
        }
    }
}

/// HTTP-style status reported to callers for each error kind.
pub fn status_code(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::Validation => 400,
        ErrorKind::RecordNotFound => 404,
        ErrorKind::NotAdmitted => 429,
        ErrorKind::LookupFailure => 502,
        ErrorKind::Internal => 500,
    }
}

/// Short machine-readable label for each error kind.
pub fn outcome_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidInput => "invalid_input",
        ErrorKind::Validation => "validation_error",
        ErrorKind::RecordNotFound => "not_found",
        ErrorKind::NotAdmitted => "not_admitted",
        ErrorKind::LookupFailure => "lookup_failure",
        ErrorKind::Internal => "internal_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::domain::country::CountryCode;
    use crate::domain::ports::CountryLookup;
    use crate::error::LookupError;
    use crate::infrastructure::in_memory::InMemoryCostStore;
    use async_trait::async_trait;
    use governor::clock::FakeRelativeClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CountryLookup for CountingLookup {
        async fn lookup(
            &self,
            _pan: &str,
        ) -> std::result::Result<CountryLookupResult, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CountryLookupResult::new(CountryCode::parse("US").unwrap()))
        }
    }

    fn gateway(capacity: u32, lookup: Arc<CountingLookup>) -> CostGateway<FakeRelativeClock> {
        let config = RateLimitConfig {
            capacity,
            refill_tokens: 1,
            refill_interval: Duration::from_secs(60),
        };
        let admission =
            AdmissionController::with_clock(&config, &FakeRelativeClock::default()).unwrap();
        let resolver = ClearingCostResolver::new(Arc::new(InMemoryCostStore::new()), lookup);
        CostGateway::new(Arc::new(admission), Arc::new(resolver))
    }

    #[tokio::test]
    async fn test_rejected_request_never_reaches_resolver() {
        let lookup = Arc::new(CountingLookup::default());
        let gateway = gateway(1, lookup.clone());

        let quote = gateway.quote("45717360").await.unwrap();
        assert!(quote.fallback);

        let err = gateway.quote("45717360").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAdmitted);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_still_consumes_token() {
        let lookup = Arc::new(CountingLookup::default());
        let gateway = gateway(1, lookup.clone());

        let err = gateway.quote("abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = gateway.quote("45717360").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAdmitted);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_code(ErrorKind::InvalidInput), 400);
        assert_eq!(status_code(ErrorKind::Validation), 400);
        assert_eq!(status_code(ErrorKind::RecordNotFound), 404);
        assert_eq!(status_code(ErrorKind::NotAdmitted), 429);
        assert_eq!(status_code(ErrorKind::LookupFailure), 502);
        assert_eq!(status_code(ErrorKind::Internal), 500);
        assert_eq!(outcome_label(ErrorKind::NotAdmitted), "not_admitted");
    }
}

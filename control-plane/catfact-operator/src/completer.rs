use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, instrument, warn};

use crate::crd::CatFactSpec;
use crate::fact::{FALLBACK_FACT, FactSource};
use crate::icons::IconCatalog;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("not a valid iconName {value}")]
pub struct InvalidIconName {
    pub value: String,
}

/// Fills the optional fields of a `CatFact` spec.
///
/// The icon is validated (or picked) before any network call, so a record
/// with a bad icon never costs a fetch. A failed fetch is not an error: the
/// fact falls back to [`FALLBACK_FACT`].
#[derive(Clone)]
pub struct RecordCompleter {
    source: Arc<dyn FactSource>,
    catalog: IconCatalog,
}

impl RecordCompleter {
    pub fn new(source: Arc<dyn FactSource>) -> Self {
        Self {
            source,
            catalog: IconCatalog,
        }
    }

    /// Completes `spec` using a fresh OS-seeded generator for the icon pick.
    pub async fn complete(
        &self,
        spec: CatFactSpec,
    ) -> Result<CatFactSpec, InvalidIconName> {
        let mut rng = StdRng::from_os_rng();
        self.complete_with_rng(spec, &mut rng).await
    }

    pub async fn complete_with_rng<R: Rng + Send + ?Sized>(
        &self,
        mut spec: CatFactSpec,
        rng: &mut R,
    ) -> Result<CatFactSpec, InvalidIconName> {
        if spec.icon_name.is_empty() {
            spec.icon_name = self.catalog.pick_random(rng).to_string();
            debug!(icon = %spec.icon_name, "icon name generated");
        } else if !self.catalog.contains(&spec.icon_name) {
            return Err(InvalidIconName {
                value: spec.icon_name,
            });
        }

        if spec.fact.is_empty() {
            spec.fact = self.fetch_fact().await;
        }

        Ok(spec)
    }

    #[instrument(skip_all)]
    async fn fetch_fact(&self) -> String {
        match self.source.fetch().await {
            Ok(fact) => fact,
            Err(e) => {
                warn!(error = %e, "fact fetch failed; using fallback fact");
                FALLBACK_FACT.to_string()
            }
        }
    }
}

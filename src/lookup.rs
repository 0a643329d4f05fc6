// src/lookup.rs
use crate::resolver::Resolve;
use crate::types::{LookupResult, RecordKind, ResolveError};
use log::{debug, trace};
use std::sync::Arc;

/// Resolves one candidate name to its addresses, chasing CNAMEs first.
#[derive(Clone)]
pub struct Lookup {
    resolver: Arc<dyn Resolve>,
    max_cname_hops: usize,
}

impl Lookup {
    pub fn new(resolver: Arc<dyn Resolve>, max_cname_hops: usize) -> Self {
        Self {
            resolver,
            max_cname_hops,
        }
    }

    /// Never fails: a name that does not resolve yields an empty vector.
    ///
    /// Every result carries `original` as its hostname, whatever the CNAME
    /// chain in between looked like.
    pub async fn lookup(&self, original: &str) -> Vec<LookupResult> {
        match self.resolve_chain(original).await {
            Ok(ips) => ips
                .into_iter()
                .map(|ip| LookupResult::new(original, ip))
                .collect(),
            Err(e) => {
                trace!("{}: {}", original, e);
                Vec::new()
            }
        }
    }

    async fn resolve_chain(&self, original: &str) -> Result<Vec<String>, ResolveError> {
        let mut current = original.to_string();
        let mut hops = 0;

        loop {
            let target = match self.resolver.resolve(&current, RecordKind::Cname).await {
                Ok(targets) => targets.into_iter().next(),
                Err(_) => None,
            };

            let Some(target) = target else {
                return self.resolver.resolve(&current, RecordKind::A).await;
            };

            if hops == self.max_cname_hops {
                debug!(
                    "{}: giving up after {} CNAME hops at {}",
                    original, hops, current
                );
                return Err(ResolveError::NoAnswer {
                    name: original.to_string(),
                    kind: RecordKind::A,
                });
            }

            trace!("{}: {} is an alias for {}", original, current, target);
            hops += 1;
            current = target;
        }
    }
}

//! Draws fresh tickets from the catalog while avoiding entries already on the desk.
use rand::Rng;
use rand::RngCore;

use crate::catalog::{Catalog, CatalogEntry};
use crate::rng::DeskRng;
use crate::ticket::Ticket;

/// Ticket generator bound to a catalog and an injected RNG stream.
///
/// Every ticket it issues gets a serial that strictly increases, so two draws
/// of the same catalog entry never share an id.
#[derive(Debug, Clone)]
pub struct TicketGenerator<R = DeskRng> {
    rng: R,
    next_serial: u64,
}

impl TicketGenerator<DeskRng> {
    /// Generator drawing from the ticket stream of `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(DeskRng::for_tickets(seed))
    }
}

impl<R: RngCore> TicketGenerator<R> {
    pub const fn with_rng(rng: R) -> Self {
        Self {
            rng,
            next_serial: 1,
        }
    }

    /// Serial the next ticket will carry.
    #[must_use]
    pub const fn next_serial(&self) -> u64 {
        self.next_serial
    }

    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }

    /// Produce one open ticket whose catalog entry is not in `exclude`.
    ///
    /// When every entry is excluded the full catalog is used instead, so this
    /// never fails.
    pub fn generate<S: AsRef<str>>(&mut self, catalog: &Catalog, exclude: &[S]) -> Ticket {
        let entry = self.pick(catalog, exclude);
        let serial = self.next_serial;
        self.next_serial = self.next_serial.saturating_add(1);
        let ticket = Ticket::from_entry(entry, serial);
        log::debug!(
            "generated ticket {} from entry {} (excluded {})",
            ticket.id,
            entry.id,
            exclude.len()
        );
        ticket
    }

    fn pick<'c, S: AsRef<str>>(&mut self, catalog: &'c Catalog, exclude: &[S]) -> &'c CatalogEntry {
        let available: Vec<&CatalogEntry> = catalog
            .entries()
            .iter()
            .filter(|entry| !exclude.iter().any(|id| id.as_ref() == entry.id))
            .collect();
        let pool: Vec<&CatalogEntry> = if available.is_empty() {
            catalog.entries().iter().collect()
        } else {
            available
        };
        let index = self.rng.gen_range(0..pool.len());
        pool[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::CountingRng;
    use rand::rngs::mock::StepRng;
    use std::collections::HashSet;

    #[test]
    fn honours_exclusions_when_candidates_remain() {
        let catalog = Catalog::builtin();
        let exclude = ["1", "2", "3", "4", "5", "6"];
        let mut generator = TicketGenerator::seeded(99);
        for _ in 0..32 {
            let ticket = generator.generate(catalog, &exclude);
            assert_eq!(ticket.catalog_id, "7");
        }
    }

    #[test]
    fn falls_back_to_full_catalog_when_everything_is_excluded() {
        let catalog = Catalog::builtin();
        let exclude: Vec<&str> = catalog.ids().collect();
        let mut generator = TicketGenerator::seeded(3);
        let ticket = generator.generate(catalog, &exclude);
        assert!(catalog.get(&ticket.catalog_id).is_some());
    }

    #[test]
    fn repeated_draws_never_collide() {
        let catalog = Catalog::builtin();
        let mut generator = TicketGenerator::seeded(11);
        let only_first: Vec<&str> = catalog.ids().filter(|id| *id != "1").collect();
        let mut ids = HashSet::new();
        for _ in 0..50 {
            let ticket = generator.generate(catalog, &only_first);
            assert_eq!(ticket.catalog_id, "1");
            assert!(ids.insert(ticket.id));
        }
        assert_eq!(generator.next_serial(), 51);
    }

    #[test]
    fn same_seed_draws_same_sequence() {
        let catalog = Catalog::builtin();
        let none: [&str; 0] = [];
        let mut a = TicketGenerator::seeded(0xC0FFEE);
        let mut b = TicketGenerator::seeded(0xC0FFEE);
        for _ in 0..10 {
            assert_eq!(a.generate(catalog, &none), b.generate(catalog, &none));
        }
        assert_eq!(a.rng().draws(), b.rng().draws());
    }

    #[test]
    fn fixed_stream_takes_first_candidate_once_per_ticket() {
        let catalog = Catalog::builtin();
        let mut generator = TicketGenerator::with_rng(CountingRng::wrap(StepRng::new(0, 0)));
        let first = generator.generate(catalog, &["1"]);
        let second = generator.generate(catalog, &["1", "2"]);
        let third = generator.generate(catalog, &["1", "2"]);
        assert_eq!(first.catalog_id, "2");
        assert_eq!(second.catalog_id, "3");
        assert_eq!(third.catalog_id, "3");
        assert_ne!(second.id, third.id);
        assert_eq!(generator.rng().draws(), 3);
    }
}

//! The assembled zone database.
//!
//! A [`ZoneDatabaseBuilder`] accumulates parsed sources and metadata, then
//! [`finish`](ZoneDatabaseBuilder::finish) validates every zone series and
//! freezes the result into a read-only [`ZoneDatabase`].

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::TzdbError;
use crate::model::{RuleRecord, RuleSet, ZoneMetadata, ZoneRecord, ZoneSeries};
use crate::source::{self, ParsedSource};

/// Counts reported after ingesting one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Zone blocks accepted.
    pub zones: usize,
    /// Zone blocks ignored because the zone was already defined.
    pub duplicate_zones: usize,
    /// Rule records accepted.
    pub rules: usize,
    /// Links accepted.
    pub links: usize,
    /// Lines skipped by the parser.
    pub skipped_lines: usize,
}

/// Accumulates tz sources and metadata before validation.
#[derive(Debug, Default)]
pub struct ZoneDatabaseBuilder {
    zones: BTreeMap<String, Vec<ZoneRecord>>,
    rules: BTreeMap<String, Vec<RuleRecord>>,
    links: BTreeMap<String, String>,
    metadata: BTreeMap<String, ZoneMetadata>,
}

impl ZoneDatabaseBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` as a tz source and merge it in.
    ///
    /// A zone defined again by a later block keeps its first definition.
    /// Rule records with an existing name are appended in declaration
    /// order. A repeated link overwrites the earlier target.
    ///
    /// # Errors
    ///
    /// Propagates [`TzdbError::Format`] from the parser; nothing from a
    /// failing source is merged.
    pub fn ingest_source(&mut self, source_name: &str, text: &str) -> Result<SourceStats, TzdbError> {
        let parsed = source::parse_source(source_name, text)?;
        Ok(self.merge(source_name, parsed))
    }

    fn merge(&mut self, source_name: &str, parsed: ParsedSource) -> SourceStats {
        let mut stats = SourceStats {
            rules: parsed.rules.len(),
            links: parsed.links.len(),
            skipped_lines: parsed.skipped_lines,
            ..SourceStats::default()
        };

        for block in parsed.zones {
            if self.zones.contains_key(&block.name) {
                warn!(source = source_name, zone = %block.name, "zone defined twice, keeping the first definition");
                stats.duplicate_zones = stats.duplicate_zones.saturating_add(1);
                continue;
            }
            stats.zones = stats.zones.saturating_add(1);
            self.zones.insert(block.name, block.records);
        }
        for rule in parsed.rules {
            self.rules.entry(rule.name.clone()).or_default().push(rule);
        }
        for link in parsed.links {
            self.links.insert(link.alias, link.target);
        }
        stats
    }

    /// Add zone metadata rows. A later row for the same zone replaces an
    /// earlier one.
    pub fn add_metadata(&mut self, entries: impl IntoIterator<Item = ZoneMetadata>) {
        for entry in entries {
            self.metadata.insert(entry.zone.clone(), entry);
        }
    }

    /// Validate every zone series and freeze the database.
    ///
    /// Series that fail validation are left out with a diagnostic; the rest
    /// of the database is unaffected.
    pub fn finish(self) -> ZoneDatabase {
        let mut zones = BTreeMap::new();
        for (name, records) in self.zones {
            match ZoneSeries::new(name.clone(), records) {
                Ok(series) => {
                    zones.insert(name, series);
                }
                Err(err) => warn!(error = %err, "dropping invalid zone series"),
            }
        }

        let rules: BTreeMap<String, RuleSet> = self
            .rules
            .into_iter()
            .map(|(name, rules)| (name.clone(), RuleSet { name, rules }))
            .collect();

        for (alias, target) in &self.links {
            if !zones.contains_key(target) {
                debug!(alias = %alias, target = %target, "link target has no zone definition");
            }
        }

        info!(
            zones = zones.len(),
            rule_sets = rules.len(),
            links = self.links.len(),
            metadata = self.metadata.len(),
            "zone database built"
        );

        ZoneDatabase {
            zones,
            rules,
            links: self.links,
            metadata: self.metadata,
        }
    }
}

/// A read-only, validated zone database.
#[derive(Debug, Clone, Default)]
pub struct ZoneDatabase {
    zones: BTreeMap<String, ZoneSeries>,
    rules: BTreeMap<String, RuleSet>,
    links: BTreeMap<String, String>,
    metadata: BTreeMap<String, ZoneMetadata>,
}

impl ZoneDatabase {
    /// The series for an exact zone name.
    pub fn zone(&self, name: &str) -> Option<&ZoneSeries> {
        self.zones.get(name)
    }

    /// The rule set for a rule name.
    pub fn rule_set(&self, name: &str) -> Option<&RuleSet> {
        self.rules.get(name)
    }

    /// The direct target of a link.
    pub fn link_target(&self, alias: &str) -> Option<&str> {
        self.links.get(alias).map(String::as_str)
    }

    /// Metadata for an exact zone name.
    pub fn metadata(&self, zone: &str) -> Option<&ZoneMetadata> {
        self.metadata.get(zone)
    }

    /// Whether `name` is a zone or a link.
    pub fn is_known_name(&self, name: &str) -> bool {
        self.zones.contains_key(name) || self.links.contains_key(name)
    }

    /// Resolve `name` to a zone name, following at most one link.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        if let Some((zone, _)) = self.zones.get_key_value(name) {
            return Some(zone.as_str());
        }
        let target = self.links.get(name)?;
        self.zones.get_key_value(target).map(|(zone, _)| zone.as_str())
    }

    /// All zone series, ordered by name.
    pub fn zones(&self) -> impl Iterator<Item = &ZoneSeries> {
        self.zones.values()
    }

    /// All links as `(alias, target)`, ordered by alias.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(alias, target)| (alias.as_str(), target.as_str()))
    }

    /// All metadata rows, ordered by zone name.
    pub fn metadata_entries(&self) -> impl Iterator<Item = &ZoneMetadata> {
        self.metadata.values()
    }

    /// Number of zones.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Number of rule sets.
    pub fn rule_set_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

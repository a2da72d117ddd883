//! Locates the site, area, line, machine and dispatch type a run works
//! against.
//!
//! Site, line, machine and dispatch type are direct filtered lookups. Areas
//! have no filter narrow enough to pick one, so [`Resolver::scan_last`] walks
//! the active areas a page at a time and keeps the last record it sees.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::{DispatchError, Result};
use crate::resource::{ResourceKind, ResourceRecord};

pub const AREA_PAGE_SIZE: usize = 2;

pub struct Resolver<'a> {
    client: &'a ApiClient,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Resolver { client }
    }

    /// The one active test site visible to the credential. Zero or several
    /// matches are both failures.
    pub fn site(&self) -> Result<ResourceRecord> {
        let kind = ResourceKind::Site;
        let mut recs = self
            .client
            .list(kind.path(), &[("active", "true"), ("test_site", "true")])?;
        match recs.len() {
            1 => Ok(recs.remove(0)),
            0 => Err(DispatchError::not_found(kind, "no active test site")),
            n => Err(DispatchError::not_found(
                kind,
                format!("{n} active test sites match, expected exactly one"),
            )),
        }
    }

    pub fn area(&self) -> Result<ResourceRecord> {
        let kind = ResourceKind::Area;
        self.scan_last(kind, &[("active", "true")], AREA_PAGE_SIZE)?
            .ok_or_else(|| DispatchError::not_found(kind, "no active area"))
    }

    pub fn line(&self, area: &ResourceRecord) -> Result<ResourceRecord> {
        let area_id = area.id.to_string();
        self.first(
            ResourceKind::Line,
            &[("area_id", area_id.as_str()), ("active", "true")],
        )
    }

    pub fn machine(&self, line: &ResourceRecord) -> Result<ResourceRecord> {
        let line_id = line.id.to_string();
        self.first(
            ResourceKind::Machine,
            &[("line_id", line_id.as_str()), ("active", "true")],
        )
    }

    pub fn dispatch_type(&self) -> Result<ResourceRecord> {
        self.first(ResourceKind::DispatchType, &[("active", "true")])
    }

    /// Page through `kind` with `limit`/`offset` and return the last record
    /// of the traversal, or `None` if the first page is empty.
    ///
    /// A page holding exactly `page_size` records may be followed by more, so
    /// the scan continues; a short or empty page ends it. The offset grows by
    /// `page_size` per full page, so the scan ends once the collection is
    /// exhausted. A server that ignores `limit` and returns more than a page
    /// is treated as having returned everything.
    pub fn scan_last(
        &self,
        kind: ResourceKind,
        filters: &[(&str, &str)],
        page_size: usize,
    ) -> Result<Option<ResourceRecord>> {
        let limit = page_size.max(1);
        let limit_param = limit.to_string();
        let mut offset = 0usize;
        let mut candidate = None;

        loop {
            let offset_param = offset.to_string();
            let mut pairs = filters.to_vec();
            pairs.push(("limit", limit_param.as_str()));
            pairs.push(("offset", offset_param.as_str()));

            let page = self.client.list(kind.path(), &pairs)?;
            debug!(%kind, offset, count = page.len(), "scanned page");

            let full = page.len() == limit;
            match page.into_iter().last() {
                Some(last) => candidate = Some(last),
                None => break,
            }
            if !full {
                break;
            }
            offset += limit;
        }

        Ok(candidate)
    }

    fn first(&self, kind: ResourceKind, filters: &[(&str, &str)]) -> Result<ResourceRecord> {
        self.client
            .list(kind.path(), filters)?
            .into_iter()
            .next()
            .ok_or_else(|| DispatchError::not_found(kind, format!("no active {kind} returned")))
    }
}

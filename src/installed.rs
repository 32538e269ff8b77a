use std::collections::BTreeSet;

use crate::{
    result::{bail, Result},
    types::ToolVersion,
};

/// Versions installed and verified during the current run
#[derive(Debug, Default)]
pub struct InstalledVersions {
    versions: BTreeSet<ToolVersion>,
}

impl InstalledVersions {
    pub fn push(&mut self, version: ToolVersion) -> Result<()> {
        let is_new = self.versions.insert(version);
        if !is_new {
            bail("Version already installed in this run")?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn contains(&self, version: &ToolVersion) -> bool {
        self.versions.contains(version)
    }
}

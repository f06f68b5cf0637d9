//! UKI kernel command-line assembly
//!
//! Every UKI carries one baseline entry that boots into install mode, plus
//! one entry per configured extra fragment.

use crate::config::defaults::{UKI_CMDLINE, UKI_CMDLINE_INSTALL};

/// Supplies the ordered extra cmdline fragments
///
/// No configuration means an empty slice.
pub trait CmdlineSource {
    /// Extra fragments in configuration order
    fn extra_cmdline(&self) -> &[String];
}

impl CmdlineSource for [String] {
    fn extra_cmdline(&self) -> &[String] {
        self
    }
}

impl CmdlineSource for Vec<String> {
    fn extra_cmdline(&self) -> &[String] {
        self
    }
}

/// Build the ordered list of UKI cmdline entries
///
/// The first entry is always `UKI_CMDLINE install-mode`. Each extra fragment
/// follows as `UKI_CMDLINE <fragment>`, without the install suffix, in
/// configuration order. Fragments are not validated.
pub fn uki_cmdline<S: CmdlineSource + ?Sized>(source: &S) -> Vec<String> {
    let extras = source.extra_cmdline();
    let mut entries = Vec::with_capacity(extras.len() + 1);

    entries.push(format!("{UKI_CMDLINE} {UKI_CMDLINE_INSTALL}"));
    entries.extend(
        extras
            .iter()
            .map(|fragment| format!("{UKI_CMDLINE} {fragment}")),
    );

    tracing::debug!("Assembled {} UKI cmdline entries", entries.len());
    entries
}

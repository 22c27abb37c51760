pub mod board;
pub mod comment;
pub mod completions;
pub mod create;
pub mod delete;
pub mod export;
pub mod init;
pub mod list;
pub mod show;
pub mod speech;
pub mod stats;
pub mod status;
pub mod update;
pub mod user;

use crate::identity::IdentityError;
use crate::output::{CliError, OutputMode, fail};
use lectern_core::{Item, StoreError};
use std::io::{self, Write};

/// Who is acting, as supplied on the command line and in the user config.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actor<'a> {
    pub flag: Option<&'a str>,
    pub config_user: Option<&'a str>,
}

pub(crate) fn store_failure(output: OutputMode, err: &StoreError) -> anyhow::Error {
    fail(output, &CliError::from(err))
}

pub(crate) fn identity_failure(output: OutputMode, err: &IdentityError) -> anyhow::Error {
    fail(
        output,
        &CliError::with_details(err.message.clone(), err.suggestion, err.code),
    )
}

/// Tab-separated `level id status name` row.
pub(crate) fn write_item_row(w: &mut dyn Write, item: &Item) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}",
        item.level(),
        item.id(),
        item.status(),
        item.name()
    )
}

/// Short id prefix for pretty tables.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_truncates_uuids_only() {
        assert_eq!(short_id("0b9c3d2e-1111-2222-3333-444455556666"), "0b9c3d2e");
        assert_eq!(short_id("1"), "1");
    }
}

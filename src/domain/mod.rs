pub mod access;
pub mod account;
pub mod list;
pub mod task;

#[cfg(test)]
mod test_util;

/// Query mode for entities supporting soft deletion. Every read against such an
/// entity states explicitly whether tombstoned rows should surface, rather than
/// relying on an implicit default filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedRows {
    Exclude,
    Include,
}

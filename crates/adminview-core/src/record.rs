//! Record identity

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};

/// An entity shown as one table row.
///
/// The id targets selection and row actions, so it must be unique within
/// a snapshot and must not depend on where the row is displayed.
pub trait Record {
    fn id(&self) -> &str;
}

/// Map every id to its position in the snapshot, rejecting duplicates
pub fn index_by_id<R: Record>(records: &[R]) -> CoreResult<HashMap<String, usize>> {
    let mut positions = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        if positions.insert(record.id().to_string(), position).is_some() {
            return Err(CoreError::DuplicateRecord {
                id: record.id().to_string(),
            });
        }
    }
    Ok(positions)
}

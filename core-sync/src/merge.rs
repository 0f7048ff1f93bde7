//! Remote/local merge pass
//!
//! Remote rows win, except where the remote lost data a user entered
//! locally: an empty remote description takes the local one, and a remote
//! series without episodes adopts the local episode list.

use std::collections::HashMap;

use core_catalog::{ContentCache, RawItem, RawSnapshot};

/// Fill gaps in `remote` from the previously persisted `local` snapshot.
/// Returns the number of fields adopted.
pub fn merge_with_local(remote: &mut ContentCache, local: &RawSnapshot) -> usize {
    let local_films = index_by_id(local.film_entries());
    let local_series = index_by_id(local.series_entries());
    let mut adopted = 0;

    for film in remote.films.iter_mut() {
        if !film.description.is_empty() {
            continue;
        }
        if let Some(description) = local_films.get(&film.id).and_then(RawItem::description) {
            film.description = description;
            adopted += 1;
        }
    }

    for series in remote.series.iter_mut() {
        let Some(local) = local_series.get(&series.item.id) else {
            continue;
        };
        if series.item.description.is_empty() {
            if let Some(description) = local.description() {
                series.item.description = description;
                adopted += 1;
            }
        }
        if series.episodes.is_empty() {
            if let Some(episodes) = local.adoptable_episodes() {
                series.episodes = episodes;
                adopted += 1;
            }
        }
    }

    adopted
}

/// First entry per identifier; later duplicates are ignored.
fn index_by_id(entries: impl Iterator<Item = RawItem>) -> HashMap<String, RawItem> {
    let mut index = HashMap::new();
    for raw in entries {
        if let Some(id) = raw.id() {
            index.entry(id).or_insert(raw);
        }
    }
    index
}

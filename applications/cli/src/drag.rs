/// Command-line syntax for drag references
///
/// - `t:<pair>:<slot>` a track (slot 0 driving, 1 driven)
/// - `p:<pair>` a whole pair
/// - `g:<index>` the gap before a pair (`g:<len>` is the end)
/// - `trash`
use duaelmix_core::SubIndex;
use duaelmix_playback::DragRef;

pub fn parse_drag_ref(raw: &str) -> Result<DragRef, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        ["trash"] => Ok(DragRef::Trash),
        ["t", pair, slot] => {
            let pair = parse_index(pair)?;
            let sub = SubIndex::from_index(parse_index(slot)?)
                .ok_or_else(|| format!("slot must be 0 or 1, got {slot}"))?;
            Ok(DragRef::Track { pair, sub })
        }
        ["p", pair] => Ok(DragRef::TrackPair {
            pair: parse_index(pair)?,
        }),
        ["g", index] => Ok(DragRef::Gap {
            index: parse_index(index)?,
        }),
        _ => Err(format!(
            "invalid reference {raw:?}; expected t:<pair>:<slot>, p:<pair>, g:<index> or trash"
        )),
    }
}

fn parse_index(raw: &str) -> Result<usize, String> {
    raw.parse()
        .map_err(|_| format!("{raw:?} is not a valid index"))
}

mod audio;
mod playlist;
mod track;

pub use audio::{AudioBuffer, CHANNELS};
pub use playlist::Playlist;
pub use track::{SubIndex, Track, TrackPair};

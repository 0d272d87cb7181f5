//! Channel remapping between multitrack frames and stereo tracks
//!
//! Track `t` always lives on channels `2t` (left) and `2t + 1` (right) of
//! the multitrack stream, in both directions.

use crate::engine::chunk::Chunk;

/// Fixed mapping from a stereo track to its multitrack channel pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackMapping {
    pub left: usize,
    pub right: usize,
}

impl TrackMapping {
    pub fn for_track(track: usize) -> Self {
        TrackMapping {
            left: 2 * track,
            right: 2 * track + 1,
        }
    }
}

/// De-interleave a multitrack chunk into one stereo chunk per track
///
/// Every output chunk is re-targeted at the source window before copying.
///
/// # Panics
/// Panics if an output is not stereo or if there are more outputs than the
/// source has channel pairs.
pub fn split_tracks(source: &Chunk, tracks: &mut [Chunk]) {
    assert!(tracks.len() * 2 <= source.channels());

    let frames = source.frame_count();
    for (t, track) in tracks.iter_mut().enumerate() {
        assert_eq!(track.channels(), 2, "track chunks must be stereo");
        track.reset(source.frame_offset(), frames);

        let map = TrackMapping::for_track(t);
        for f in 0..frames {
            let frame = source.frame(f);
            let out = track.frame_mut(f);
            out[0] = frame[map.left];
            out[1] = frame[map.right];
        }
    }
}

/// Interleave stereo tracks into a multitrack chunk
///
/// `dest` must already be re-targeted at the window being built. Channel
/// pairs without a source are left silent, and each source contributes only
/// its own valid frames; frames beyond a source's `frame_count` stay silent.
///
/// # Panics
/// Panics if a source is not stereo or does not fit in `dest`.
pub fn merge_tracks(tracks: &[Chunk], dest: &mut Chunk) {
    assert!(tracks.len() * 2 <= dest.channels());

    dest.silence_from(0);
    for (t, track) in tracks.iter().enumerate() {
        assert_eq!(track.channels(), 2, "track chunks must be stereo");
        let map = TrackMapping::for_track(t);
        let frames = track.frame_count().min(dest.frame_count());
        for f in 0..frames {
            let pair = track.frame(f);
            let out = dest.frame_mut(f);
            out[map.left] = pair[0];
            out[map.right] = pair[1];
        }
    }
}

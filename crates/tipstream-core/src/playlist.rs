//! Variant-ladder extraction and quality selection for master playlists.

use m3u8_rs::Playlist;
use url::Url;

use crate::config::Quality;
use crate::error::ResolveError;

/// One `#EXT-X-STREAM-INF` declaration, numeric attributes defaulted to 0
/// when the manifest omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistVariant {
    pub bandwidth: u64,
    pub resolution_height: u64,
    pub average_bandwidth: u64,
    pub uri: String,
}

/// Extract the ascending quality ladder from manifest text.
///
/// Ordered by `(resolution_height, average_bandwidth, bandwidth)`; equal
/// ranks put the longer URI first. The ladder is rebuilt on every
/// resolution and never cached.
pub fn build_ladder(manifest: &str) -> Result<Vec<PlaylistVariant>, ResolveError> {
    let master = match m3u8_rs::parse_playlist_res(manifest.as_bytes()) {
        Ok(Playlist::MasterPlaylist(master)) => master,
        // A media playlist has no variant declarations: empty ladder.
        Ok(Playlist::MediaPlaylist(_)) => return Ok(Vec::new()),
        Err(e) => {
            return Err(ResolveError::mismatch(format!("manifest did not parse: {e}")));
        }
    };

    let mut ladder: Vec<PlaylistVariant> = master
        .variants
        .iter()
        .filter(|v| !v.is_i_frame)
        .map(|v| PlaylistVariant {
            bandwidth: v.bandwidth,
            resolution_height: v.resolution.as_ref().map(|r| r.height).unwrap_or(0),
            average_bandwidth: v.average_bandwidth.unwrap_or(0),
            uri: v.uri.clone(),
        })
        .collect();

    ladder.sort_by(|a, b| {
        (a.resolution_height, a.average_bandwidth, a.bandwidth)
            .cmp(&(b.resolution_height, b.average_bandwidth, b.bandwidth))
            .then_with(|| b.uri.len().cmp(&a.uri.len()))
    });
    Ok(ladder)
}

/// Pick one rung of the ladder for the requested quality.
///
/// An exact slot is used when the ladder is deep enough; otherwise Low and
/// Mid fall back to the lowest rung and High to the best available.
pub fn select_variant(
    ladder: &[PlaylistVariant],
    quality: Quality,
) -> Result<&PlaylistVariant, ResolveError> {
    if ladder.is_empty() {
        return Err(ResolveError::EmptyLadder);
    }
    let slot = quality.slot();
    if ladder.len() >= slot + 1 {
        return Ok(&ladder[slot]);
    }
    match quality {
        Quality::Low | Quality::Mid => Ok(&ladder[0]),
        Quality::High => Ok(&ladder[ladder.len() - 1]),
    }
}

/// Resolve a possibly relative variant URI against the manifest URL with
/// its query string stripped.
pub fn resolve_variant_uri(manifest_url: &Url, uri: &str) -> Result<String, ResolveError> {
    let uri = uri.trim();
    if Url::parse(uri).is_ok() {
        return Ok(uri.to_string());
    }
    let mut base = manifest_url.clone();
    base.set_query(None);
    base.join(uri)
        .map(|joined| joined.to_string())
        .map_err(|e| ResolveError::mismatch(format!("variant URI {uri:?} did not resolve: {e}")))
}

/// Full resolution step: ladder, selection, base-relative join.
pub fn resolve_stream_url(
    manifest: &str,
    manifest_url: &Url,
    quality: Quality,
) -> Result<String, ResolveError> {
    let ladder = build_ladder(manifest)?;
    let variant = select_variant(&ladder, quality)?;
    resolve_variant_uri(manifest_url, &variant.uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_RUNG_MANIFEST: &str = "\
#EXTM3U
#EXT-X-VERSION:3
#EXT-X-STREAM-INF:BANDWIDTH=2800000,AVERAGE-BANDWIDTH=2500000,RESOLUTION=1280x720
chunklist_720.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=400000,AVERAGE-BANDWIDTH=350000,RESOLUTION=320x180
chunklist_180.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=1200000,AVERAGE-BANDWIDTH=1000000,RESOLUTION=640x360
chunklist_360.m3u8
";

    fn rung(height: u64, uri: &str) -> PlaylistVariant {
        PlaylistVariant {
            bandwidth: height * 1000,
            resolution_height: height,
            average_bandwidth: height * 900,
            uri: uri.to_string(),
        }
    }

    #[test]
    fn ladder_sorts_ascending_by_height() {
        let ladder = build_ladder(THREE_RUNG_MANIFEST).unwrap();
        let heights: Vec<u64> = ladder.iter().map(|v| v.resolution_height).collect();
        assert_eq!(heights, vec![180, 360, 720]);
    }

    #[test]
    fn absent_attributes_default_to_zero() {
        let manifest = "\
#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=1200000
bare.m3u8
";
        let ladder = build_ladder(manifest).unwrap();
        assert_eq!(ladder.len(), 1);
        assert_eq!(ladder[0].resolution_height, 0);
        assert_eq!(ladder[0].average_bandwidth, 0);
        assert_eq!(ladder[0].bandwidth, 1_200_000);
    }

    #[test]
    fn media_playlist_yields_empty_ladder() {
        let manifest = "\
#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:10
#EXT-X-MEDIA-SEQUENCE:0
#EXTINF:10.0,
seg_0.ts
";
        let ladder = build_ladder(manifest).unwrap();
        assert!(ladder.is_empty());
        assert!(matches!(
            select_variant(&ladder, Quality::High),
            Err(ResolveError::EmptyLadder)
        ));
    }

    #[test]
    fn selection_never_fails_for_nonempty_ladder() {
        for n in 1..=4usize {
            let ladder: Vec<PlaylistVariant> =
                (0..n).map(|i| rung(180 * (i as u64 + 1), "x.m3u8")).collect();
            for quality in [Quality::Low, Quality::Mid, Quality::High] {
                assert!(select_variant(&ladder, quality).is_ok(), "n={n} q={quality:?}");
            }
        }
    }

    #[test]
    fn exact_slot_selected_when_deep_enough() {
        let ladder = vec![rung(180, "a"), rung(360, "b"), rung(720, "c")];
        assert_eq!(select_variant(&ladder, Quality::Low).unwrap().resolution_height, 180);
        assert_eq!(select_variant(&ladder, Quality::Mid).unwrap().resolution_height, 360);
        assert_eq!(select_variant(&ladder, Quality::High).unwrap().resolution_height, 720);
    }

    #[test]
    fn single_rung_serves_every_quality() {
        let ladder = vec![rung(540, "only")];
        for quality in [Quality::Low, Quality::Mid, Quality::High] {
            assert_eq!(select_variant(&ladder, quality).unwrap().uri, "only");
        }
    }

    #[test]
    fn two_rungs_mid_hits_exact_slot_high_takes_last() {
        let ladder = vec![rung(180, "a"), rung(360, "b")];
        assert_eq!(select_variant(&ladder, Quality::Mid).unwrap().uri, "b");
        assert_eq!(select_variant(&ladder, Quality::High).unwrap().uri, "b");
        assert_eq!(select_variant(&ladder, Quality::Low).unwrap().uri, "a");
    }

    // Observed ordering only: equal-rank rungs surface the longer URI
    // first. Do not rely on it meaning anything.
    #[test]
    fn ladder_tie_break_prefers_longer_uri() {
        let manifest = "\
#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=1000000,RESOLUTION=640x360
short.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=1000000,RESOLUTION=640x360
much_longer_name.m3u8
";
        let ladder = build_ladder(manifest).unwrap();
        assert_eq!(ladder[0].uri, "much_longer_name.m3u8");
        assert_eq!(ladder[1].uri, "short.m3u8");
    }

    #[test]
    fn relative_uri_resolves_against_query_stripped_manifest_url() {
        let manifest_url = Url::parse("https://x.com/path/playlist.m3u8?t=1").unwrap();
        let resolved = resolve_variant_uri(&manifest_url, "chunklist_a.m3u8").unwrap();
        assert_eq!(resolved, "https://x.com/path/chunklist_a.m3u8");
    }

    #[test]
    fn absolute_uri_passes_through() {
        let manifest_url = Url::parse("https://x.com/path/playlist.m3u8").unwrap();
        let resolved =
            resolve_variant_uri(&manifest_url, "https://cdn.y.com/chunk.m3u8?auth=1").unwrap();
        assert_eq!(resolved, "https://cdn.y.com/chunk.m3u8?auth=1");
    }

    #[test]
    fn garbage_manifest_never_yields_a_stream() {
        let manifest_url = Url::parse("https://x.com/playlist.m3u8").unwrap();
        let err = resolve_stream_url("<html>not a playlist</html>", &manifest_url, Quality::High)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ProtocolMismatch { .. } | ResolveError::EmptyLadder
        ));
    }
}

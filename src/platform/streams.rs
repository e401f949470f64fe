//! Stream list normalization

use crate::core::video_info::{Stream, StreamingData};
use crate::platform::cipher::Decoder;
use tracing::{debug, warn};

/// Check if any stream needs deciphering
pub fn has_cipher_streams(streaming: &StreamingData) -> bool {
    streaming
        .formats
        .iter()
        .chain(&streaming.adaptive_formats)
        .any(|s| s.signature_cipher.is_some())
}

/// Merge, decipher and filter streams.
///
/// Progressive formats come first, each list keeps its order. Without a
/// decoder, cipher-protected streams stay unresolved and are dropped.
pub fn normalize_streams(streaming: StreamingData, decoder: Option<&Decoder>) -> Vec<Stream> {
    let StreamingData {
        formats,
        adaptive_formats,
    } = streaming;

    let total = formats.len() + adaptive_formats.len();
    let streams: Vec<Stream> = formats
        .into_iter()
        .chain(adaptive_formats)
        .map(|stream| match decoder {
            Some(decoder) => decipher_stream(stream, decoder),
            None => stream,
        })
        .filter(Stream::is_resolved)
        .collect();

    debug!("Normalized {} of {} streams", streams.len(), total);
    streams
}

fn decipher_stream(mut stream: Stream, decoder: &Decoder) -> Stream {
    if stream.url.is_some() {
        return stream;
    }
    let Some(payload) = stream.signature_cipher.as_deref() else {
        return stream;
    };

    match decoder.resolve(payload) {
        Ok(url) => {
            stream.url = Some(url);
            stream.signature_cipher = None;
        }
        Err(e) => warn!("Leaving stream {:?} unresolved: {}", stream.itag(), e),
    }
    stream
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::jsops::{Op, SignatureProgram};
    use serde_json::json;

    fn reversing_decoder() -> Decoder {
        Decoder::new("/base.js", SignatureProgram::from_ops(vec![Op::Reverse]))
    }

    fn tagged(mut stream: Stream, itag: u64) -> Stream {
        stream.extra.insert("itag".to_string(), json!(itag));
        stream
    }

    #[test]
    fn test_has_cipher_streams() {
        let mut data = StreamingData::default();
        assert!(!has_cipher_streams(&data));
        data.formats.push(Stream::with_url("https://m/a"));
        assert!(!has_cipher_streams(&data));
        data.adaptive_formats.push(Stream::with_cipher("s=x&url=y"));
        assert!(has_cipher_streams(&data));
    }

    #[test]
    fn test_order_formats_first() {
        let data = StreamingData {
            formats: vec![
                tagged(Stream::with_url("https://m/18"), 18),
                tagged(Stream::with_url("https://m/22"), 22),
            ],
            adaptive_formats: vec![
                tagged(Stream::with_url("https://m/137"), 137),
                tagged(Stream::with_url("https://m/140"), 140),
            ],
        };

        let itags: Vec<_> = normalize_streams(data, None)
            .iter()
            .filter_map(Stream::itag)
            .collect();
        assert_eq!(itags, vec![18, 22, 137, 140]);
    }

    #[test]
    fn test_without_decoder_drops_cipher_streams() {
        let direct = tagged(Stream::with_url("https://m/18"), 18);
        let data = StreamingData {
            formats: vec![direct.clone()],
            adaptive_formats: vec![tagged(Stream::with_cipher("s=abc&sp=sig&url=https%3A%2F%2Fm"), 137)],
        };

        let streams = normalize_streams(data, None);
        assert_eq!(streams, vec![direct]);
    }

    #[test]
    fn test_with_decoder_resolves_cipher_streams() {
        let direct = tagged(Stream::with_url("https://m/18"), 18);
        let data = StreamingData {
            formats: vec![direct.clone()],
            adaptive_formats: vec![tagged(
                Stream::with_cipher("s=abc&sp=sig&url=https%3A%2F%2Fm%2Fv%3Fitag%3D137"),
                137,
            )],
        };

        let decoder = reversing_decoder();
        let streams = normalize_streams(data, Some(&decoder));

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0], direct);
        assert_eq!(streams[1].url.as_deref(), Some("https://m/v?itag=137&sig=cba"));
        assert!(streams[1].signature_cipher.is_none());
        assert_eq!(streams[1].itag(), Some(137));
    }

    #[test]
    fn test_direct_url_wins_over_cipher() {
        let mut both = Stream::with_url("https://m/direct");
        both.signature_cipher = Some("s=abc&url=https%3A%2F%2Fm%2Fother".to_string());
        let data = StreamingData {
            formats: vec![both.clone()],
            adaptive_formats: vec![],
        };

        let decoder = reversing_decoder();
        assert_eq!(normalize_streams(data, Some(&decoder)), vec![both]);
    }

    #[test]
    fn test_bad_payload_is_dropped() {
        let data = StreamingData {
            formats: vec![
                Stream::with_cipher("sp=sig"),
                Stream::with_cipher("s=xy&url=https%3A%2F%2Fm%2Fv"),
            ],
            adaptive_formats: vec![Stream::default()],
        };

        let decoder = reversing_decoder();
        let streams = normalize_streams(data, Some(&decoder));
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].url.as_deref(), Some("https://m/v?signature=yx"));
    }
}

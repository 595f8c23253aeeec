use tracing::warn;

/// Delimiter the model uses around section titles.
pub const BOLD_MARKER: &str = "**";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Heading,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

/// Plan text split into headings (text between paired bold markers) and body text.
#[derive(Debug, Default)]
pub struct Outline {
    pub segments: Vec<Segment>,
    /// Byte offsets of markers left in body text because no valid partner exists.
    pub unpaired_markers: Vec<usize>,
}

impl Outline {
    pub fn headings(&self) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Heading)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.kind == SegmentKind::Body)
    }
}

/// With 2N markers, pairs them left to right: N headings and N + 1 bodies,
/// empty ones included. With an odd count a pair becomes a heading only if the
/// opening marker starts a word and the pair stays on one line; every other
/// marker is recorded in `unpaired_markers` and kept literally in the body.
pub fn parse(text: &str) -> Outline {
    let offsets: Vec<usize> = text.match_indices(BOLD_MARKER).map(|(i, _)| i).collect();

    let (pairs, unpaired_markers) = if offsets.len() % 2 == 0 {
        let pairs = offsets.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        (pairs, Vec::new())
    } else {
        validated_pairs(text, &offsets)
    };

    if !unpaired_markers.is_empty() {
        warn!(
            offsets = ?unpaired_markers,
            markers = offsets.len(),
            "unpaired bold markers in plan text; kept as body text"
        );
    }

    let mut segments = Vec::with_capacity(pairs.len() * 2 + 1);
    let mut cursor = 0;
    for (open, close) in pairs {
        segments.push(segment(SegmentKind::Body, &text[cursor..open]));
        segments.push(segment(
            SegmentKind::Heading,
            &text[open + BOLD_MARKER.len()..close],
        ));
        cursor = close + BOLD_MARKER.len();
    }
    segments.push(segment(SegmentKind::Body, &text[cursor..]));

    Outline {
        segments,
        unpaired_markers,
    }
}

fn validated_pairs(text: &str, offsets: &[usize]) -> (Vec<(usize, usize)>, Vec<usize>) {
    let mut pairs = Vec::new();
    let mut unpaired = Vec::new();
    let mut i = 0;
    while i < offsets.len() {
        let open = offsets[i];
        let close = offsets.get(i + 1).copied().filter(|&close| {
            opens_word(text, open) && !text[open..close].contains('\n')
        });
        match close {
            Some(close) => {
                pairs.push((open, close));
                i += 2;
            }
            None => {
                unpaired.push(open);
                i += 1;
            }
        }
    }
    (pairs, unpaired)
}

/// An opening marker sits at a line start or after whitespace (list bullets included).
fn opens_word(text: &str, offset: usize) -> bool {
    text[..offset]
        .chars()
        .next_back()
        .is_none_or(char::is_whitespace)
}

fn segment(kind: SegmentKind, text: &str) -> Segment {
    Segment {
        kind,
        text: text.trim().to_string(),
    }
}

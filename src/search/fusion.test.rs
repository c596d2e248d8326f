use super::*;

fn ranked(ids: &[&str]) -> Vec<RankedChunk> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| RankedChunk {
            chunk_id: id.to_string(),
            score: 1.0 / (i as f64 + 1.0),
        })
        .collect()
}

#[test]
fn fuses_two_sources_by_reciprocal_rank() {
    let dense = ranked(&["a", "b", "c"]);
    let lexical = ranked(&["b", "a", "d"]);
    let fused = fuse(
        &[
            RrfSource { ranked: &dense, weight: 1.0 },
            RrfSource { ranked: &lexical, weight: 1.0 },
        ],
        60.0,
        10,
    );

    let pos = |id: &str| fused.iter().position(|r| r.chunk_id == id).unwrap();
    assert!(pos("a") < pos("d"));
    assert!(pos("b") < pos("d"));
}

#[test]
fn ties_break_by_chunk_id() {
    let one = vec![RankedChunk { chunk_id: "z".into(), score: 1.0 }];
    let two = vec![RankedChunk { chunk_id: "a".into(), score: 1.0 }];
    let fused = fuse(
        &[
            RrfSource { ranked: &one, weight: 1.0 },
            RrfSource { ranked: &two, weight: 1.0 },
        ],
        60.0,
        10,
    );
    assert_eq!(fused[0].chunk_id, "a");
    assert_eq!(fused[1].chunk_id, "z");
}

#[test]
fn respects_limit() {
    let dense = ranked(&["a", "b", "c", "d", "e"]);
    let fused = fuse(&[RrfSource { ranked: &dense, weight: 1.0 }], 60.0, 2);
    assert_eq!(fused.len(), 2);
}

#[test]
fn is_deterministic_across_repeated_runs() {
    let dense = ranked(&["a", "b", "c"]);
    let lexical = ranked(&["c", "b", "a"]);
    let sources = [
        RrfSource { ranked: &dense, weight: 1.0 },
        RrfSource { ranked: &lexical, weight: 1.0 },
    ];
    let first = fuse(&sources, 60.0, 10);
    let second = fuse(&sources, 60.0, 10);
    assert_eq!(first, second);
}

use finrag_embed::{Embedder, FakeEmbedder};

#[tokio::test]
async fn fake_embedder_shape_norm_and_determinism() {
    let embedder = FakeEmbedder::default();
    let texts = vec![
        "total revenue 2023".to_string(),
        "total revenue 2023".to_string(),
    ];
    let embs = embedder.embed_many(&texts).await.expect("embed_many");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 1024, "embedding dim is 1024");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for the same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[tokio::test]
async fn embed_many_matches_repeated_embed_one() {
    let embedder = FakeEmbedder::default();
    let texts = vec!["cash flow".to_string(), "balance sheet".to_string()];
    let batch = embedder.embed_many(&texts).await.expect("embed_many");
    for (text, batched) in texts.iter().zip(&batch) {
        let single = embedder.embed_one(text).await.expect("embed_one");
        assert_eq!(&single, batched);
    }
}

#[tokio::test]
async fn different_texts_get_different_vectors() {
    let embedder = FakeEmbedder::default();
    let a = embedder.embed_one("income statement").await.expect("embed");
    let b = embedder.embed_one("discount rate").await.expect("embed");
    assert_ne!(a, b);
}

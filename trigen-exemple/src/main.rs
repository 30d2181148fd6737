use std::path::Path;

use ndarray::array;

use trigen_attention::scaled_dot_product_attention;
use trigen_core::model::generator::Generator;
use trigen_core::model::trigram_model::TrigramModel;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Train a model directly on an inline corpus. Words that appear fewer
    // than two times are replaced by the unknown symbol during training.
    let mut model = TrigramModel::new();
    model.fit(
        "the cat sat on the mat. the cat ran after the dog. \
         the dog sat on the mat. the cat sat quietly.",
    );

    // Generate a few texts with the thread-local random source
    for i in 0..5 {
        println!("Generated text {}: {}", i + 1, model.generate(50));
    }

    // A fixed seed makes the output reproducible
    println!("Seeded text: {}", model.generate_seeded(50, 42));
    println!("Same seed again: {}", model.generate_seeded(50, 42));

    // Load all corpora from the "data" directory (.txt files) if present.
    // A cached .bin next to a corpus is reused instead of retraining.
    if Path::new("./data").is_dir() {
        let generator = Generator::new("./data")?;
        for name in generator.get_model_names() {
            println!("{}: {}", name, generator.generate(&name, 50)?);
        }
    }

    // Scaled dot-product attention on sample matrices: batch=1, seq_len=3.
    // Q and K use one-hot-like rows so each query mostly attends to itself.
    let q = array![[
        [1.0_f32, 0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0, 1.0],
        [1.0, 1.0, 0.0, 0.0]
    ]];
    let k = q.clone();
    let v = array![[[10.0_f32, 0.0], [0.0, 10.0], [5.0, 5.0]]];

    let (output, attn_weights) = scaled_dot_product_attention(&q, &k, &v, None)?;

    println!("\nAttention Weights:\n{}", attn_weights);
    println!("\nOutput:\n{}", output);

    Ok(())
}

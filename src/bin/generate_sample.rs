use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated row.
struct Person {
    id: i64,
    name: String,
    age: i64,
    height_cm: Option<f64>,
    color: &'static str,
    member: bool,
}

fn generate(rng: &mut SimpleRng, n: i64) -> Vec<Person> {
    let first_names = ["Ann", "Bo", "Cy", "Dee", "Eli", "Fay", "Gus", "Hal"];
    let colors = ["red", "red", "red", "blue", "blue", "green"];

    (0..n)
        .map(|id| {
            let age = rng.gauss(41.0, 12.0).round().clamp(18.0, 90.0) as i64;
            let height = (rng.gauss(172.0, 9.0) * 10.0).round() / 10.0;
            Person {
                id,
                name: format!("{} {}", rng.pick(&first_names), id),
                age,
                // Every seventh measurement is missing.
                height_cm: (id % 7 != 3).then_some(height),
                color: rng.pick(&colors),
                member: rng.next_f64() < 0.4,
            }
        })
        .collect()
}

fn write_csv(path: &str, people: &[Person]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    wtr.write_record(["id", "Name", "Age", "Height cm", "Color", "Member"])?;
    for p in people {
        wtr.write_record([
            p.id.to_string(),
            p.name.clone(),
            p.age.to_string(),
            p.height_cm.map(|h| h.to_string()).unwrap_or_default(),
            p.color.to_string(),
            p.member.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_parquet(path: &str, people: &[Person]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("Name", DataType::Utf8, false),
        Field::new("Age", DataType::Int64, false),
        Field::new("Height cm", DataType::Float64, true),
        Field::new("Color", DataType::Utf8, false),
        Field::new("Member", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(people.iter().map(|p| p.id))),
            Arc::new(StringArray::from_iter_values(people.iter().map(|p| p.name.as_str()))),
            Arc::new(Int64Array::from_iter_values(people.iter().map(|p| p.age))),
            Arc::new(Float64Array::from(people.iter().map(|p| p.height_cm).collect::<Vec<_>>())),
            Arc::new(StringArray::from_iter_values(people.iter().map(|p| p.color))),
            Arc::new(BooleanArray::from(people.iter().map(|p| p.member).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let people = generate(&mut rng, 200);

    write_csv("sample_data.csv", &people)?;
    write_parquet("sample_data.parquet", &people)?;

    log::info!("Generated {} rows", people.len());
    println!("Wrote {} rows to sample_data.csv and sample_data.parquet", people.len());
    Ok(())
}

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixel_csv::color::RgbaDot;
use pixel_csv::encoder::{CsvEncoder, PixelEncoding};
use pixel_csv::raster::Raster;
use threadpool::ThreadPool;

const IMAGE_WIDTH: u32 = 1920;
const IMAGE_HEIGHT: u32 = 1080;
const IMAGE_SIZE: usize = IMAGE_WIDTH as usize * IMAGE_HEIGHT as usize;

fn create_test_raster() -> Raster {
    let dots: Vec<RgbaDot> = (0..IMAGE_SIZE)
        .map(|index| {
            let x = (index % IMAGE_WIDTH as usize) as u32;
            let y = (index / IMAGE_WIDTH as usize) as u32;
            let value = ((x + y * 8) % 256) as u8;
            RgbaDot::opaque(value, 255 - value, value / 2)
        })
        .collect();
    Raster::from_dots(IMAGE_WIDTH, IMAGE_HEIGHT, &dots)
}

fn calculate_std_deviation_in_micros(mean: &Duration, measurements: &[Duration]) -> u64 {
    let mean_micros = mean.as_micros() as i128;
    let sum = measurements
        .iter()
        .map(|m| m.as_micros() as i128 - mean_micros)
        .map(|v| v.pow(2).unsigned_abs())
        .sum::<u128>();
    let variance = sum / measurements.len() as u128;
    (variance as f64).sqrt().round() as u64
}

const NUMBER_OF_ROUNDS: u32 = 10;

fn time_rounds<F: Fn() -> String>(label: &str, encode: F) {
    println!("Starting {} encoding", label);
    let mut durations: Vec<Duration> = Vec::new();

    for round in 1..=NUMBER_OF_ROUNDS {
        let start = Instant::now();
        let csv = encode();
        let duration = start.elapsed();

        println!(
            "Finished round {} after {} microseconds ({} bytes)",
            round,
            duration.as_micros(),
            csv.len(),
        );
        durations.push(duration);
    }

    let min_duration = durations.iter().min().copied().unwrap_or_default();
    let max_duration = durations.iter().max().copied().unwrap_or_default();
    let avg_duration = durations.iter().sum::<Duration>() / NUMBER_OF_ROUNDS;
    let std_deviation = calculate_std_deviation_in_micros(&avg_duration, &durations);

    println!(
        "{}: Min: {}, Max: {}, Average: {}, Std Deviation: {}",
        label,
        min_duration.as_micros(),
        max_duration.as_micros(),
        avg_duration.as_micros(),
        std_deviation,
    );
}

fn main() {
    println!("Creating test raster");
    let raster = Arc::new(create_test_raster());
    let number_of_threads = thread::available_parallelism().map_or(1, |n| n.get());
    let threadpool = ThreadPool::new(number_of_threads);

    for encoding in [PixelEncoding::Grayscale, PixelEncoding::Rgb] {
        let encoder = CsvEncoder::new(Arc::clone(&raster), encoding);
        time_rounds(&format!("sequential {}", encoding), || encoder.encode());
        time_rounds(&format!("pooled {}", encoding), || {
            encoder.encode_with(&threadpool)
        });
    }
}

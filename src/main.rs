//! Record Pipeline Demo
//!
//! Fabricates a few singers, writes them to an in-memory stream, copies the
//! stream to `output.txt` under the data directory, then counts singers with
//! more than the minimum number of songs.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | RECORD_PIPELINE_COUNT | 3 | Number of singers to generate |
//! | RECORD_PIPELINE_MIN_SONGS | 0 | Count singers with more songs than this |
//! | RECORD_STREAM_ITEM_DELAY_MS | 1500 | Simulated latency per record |
//! | RECORD_STREAM_CHUNK_SIZE | 16384 | Copy read size |
//! | RECORD_STREAM_DATA_DIR | . | Where `output.txt` is written |
//! | RECORD_STREAM_LOG_JSON | false | Emit JSON logs |
//! | RUST_LOG | info | Log filter |

use rand::Rng;
use record_stream::streaming::{
    ProgressEvent, Singer, StreamConfig, StreamService, STATISTICS_UNAVAILABLE,
};
use std::io::Cursor;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SINGER_COUNT: usize = 3;
const DEFAULT_MIN_SONGS: i32 = 0;
const SONGS_MAX: i32 = 10;
const OUTPUT_NAME: &str = "output.txt";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("RECORD_STREAM_LOG_JSON")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn sample_singers(count: usize) -> Vec<Singer> {
    let mut rng = rand::thread_rng();
    (1..=count as i32)
        .map(|id| Singer::new(id, format!("Singer {}", id), rng.gen_range(0..SONGS_MAX)))
        .collect()
}

/// Console presenter: prints each event with the thread that emitted it
fn print_progress(event: &ProgressEvent) {
    println!("[thread {:?}] {}", std::thread::current().id(), event);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = StreamConfig::from_env();
    config.validate()?;
    info!(config = %serde_json::to_string(&config)?, "Starting record pipeline");

    let singer_count = env_or("RECORD_PIPELINE_COUNT", DEFAULT_SINGER_COUNT);
    let min_songs = env_or("RECORD_PIPELINE_MIN_SONGS", DEFAULT_MIN_SONGS);
    let singers = sample_singers(singer_count);

    println!("Main thread: {:?}", std::thread::current().id());
    let service = StreamService::local(config);

    // Stage 1 runs as its own task; the sink comes back when it finishes
    let writer = {
        let service = service.clone();
        tokio::spawn(async move {
            let mut sink = Cursor::new(Vec::new());
            service
                .write_to_stream(&mut sink, &singers, &print_progress)
                .await
                .map(|_| sink)
        })
    };
    let mut sink = writer.await??;
    sink.set_position(0);

    service
        .copy_from_stream(&mut sink, OUTPUT_NAME, &print_progress)
        .await?;

    let count = service
        .statistics(OUTPUT_NAME, |singer: &Singer| singer.count > min_songs)
        .await;

    if count == STATISTICS_UNAVAILABLE {
        println!("Statistics: unavailable (see log)");
    } else {
        println!(
            "Statistics: {} singers have more than {} songs",
            count, min_songs
        );
    }
    Ok(())
}

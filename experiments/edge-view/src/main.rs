use {
    base::Vec2,
    camera::{CameraConfig, FrameSink, Session, SessionEvent, Surface, SyntheticDriver, Tag},
    edge_view::{EdgeDetector, EdgeMap, encode_png},
    std::{
        path::{Path, PathBuf},
        sync::Arc,
    },
    tokio::sync::mpsc,
};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;
const DEFAULT_FRAMES: usize = 30;

fn save_png(path: &Path, size: Vec2<usize>, luma: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, encode_png(size, luma)?)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    base::init_stdout_logger();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "edge-view-out".to_string()));
    let frames = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_FRAMES)
        .max(2);
    std::fs::create_dir_all(&out_dir)?;

    log::info!("Edge View: {} frames at {}x{} into {}", frames, WIDTH, HEIGHT, out_dir.display());

    let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent<EdgeMap>>();
    let surface = Surface::new(1, Vec2::new(WIDTH, HEIGHT));
    let session = Session::start(
        Box::new(SyntheticDriver::new()),
        &surface,
        CameraConfig::default(),
        EdgeDetector::default(),
        tx.clone(),
    )?;

    let mut results = 0;
    let mut picture_saved = false;
    while let Some(event) = rx.recv().await {
        match event {
            SessionEvent::ResultReady(edges) => {
                results += 1;
                log::debug!("edge map {}: {} edge pixels", results, edges.edge_count());
                if results % 10 == 0 || results == frames {
                    save_png(&out_dir.join("edges.png"), edges.size, &edges.data)?;
                }
                if results == frames / 2 {
                    let destination: Arc<dyn FrameSink> = Arc::new(tx.clone());
                    session.owner().submit_request_picture(destination, Tag(1))?;
                }
            }
            SessionEvent::PictureReady(picture) => {
                let size = Vec2::new(picture.width(), picture.height());
                save_png(&out_dir.join("picture.png"), size, picture.bytes())?;
                picture_saved = true;
            }
            SessionEvent::PreviewCaptured(_) => {}
        }
        if results >= frames && picture_saved {
            break;
        }
    }

    log::info!("Exiting...");
    tokio::task::spawn_blocking(move || {
        let mut session = session;
        session.stop()
    })
    .await??;
    Ok(())
}

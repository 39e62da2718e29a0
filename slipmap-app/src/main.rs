use anyhow::{bail, Context, Result};
use image::{Rgba, RgbaImage};
use slipmap::prelude::*;
use std::path::PathBuf;

const USAGE: &str = "usage:
  slipmap-app slice <image> <tile_size> <dest_dir>
  slipmap-app demo [out.png]";

/// Headless companion to the library: cuts images into tile pyramids and
/// renders an animated pan into a PNG.
fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("slice") => match &args[1..] {
            [image, tile_size, dest] => slice(image, tile_size, dest),
            _ => bail!("{}", USAGE),
        },
        Some("demo") => {
            let out = args.get(1).map_or("slipmap-demo.png", String::as_str);
            demo(PathBuf::from(out))
        }
        _ => bail!("{}", USAGE),
    }
}

fn slice(image_path: &str, tile_size: &str, dest: &str) -> Result<()> {
    let tile_size: u32 = tile_size
        .parse()
        .with_context(|| format!("invalid tile size {:?}", tile_size))?;
    let image = image::open(image_path)
        .with_context(|| format!("failed to open {}", image_path))?
        .to_rgba8();

    let dest = PathBuf::from(dest);
    let (metrics, written) = write_pyramid(&image, tile_size, &dest)
        .with_context(|| format!("failed to slice into {}", dest.display()))?;

    let metrics_path = dest.join("metrics.json");
    let json = serde_json::to_string_pretty(&metrics).context("failed to encode pyramid metrics")?;
    std::fs::write(&metrics_path, json)
        .with_context(|| format!("failed to write {}", metrics_path.display()))?;

    log::info!("wrote {} tiles to {}", written, dest.display());
    println!(
        "{}x{} image, {} zoom levels, {} tiles",
        metrics.width,
        metrics.height,
        metrics.zoom_levels + 1,
        written
    );
    Ok(())
}

/// Fills a cache with synthetic checkerboard tiles for the zoom levels the
/// demo visits. Every other tile is left out so the fallback path shows up.
fn synthetic_cache(config: &MapConfig, source: &TileSource, zoom: u32, around: &TileAddress) -> MemoryTileCache {
    let cache = MemoryTileCache::from_config(config);
    let size = source.tile_size_pixels();
    for level in [zoom - 1, zoom] {
        let shift = zoom - level;
        let (cx, cy) = (around.x >> shift, around.y >> shift);
        for x in cx - 4..=cx + 4 {
            for y in cy - 4..=cy + 4 {
                if level == zoom && (x + y) % 2 == 0 {
                    continue;
                }
                let shade = if (x + y) % 2 == 0 { 90 } else { 170 };
                let mut tile = RgbaImage::from_pixel(size, size, Rgba([shade, shade, 200, 255]));
                for i in 0..size {
                    tile.put_pixel(i, 0, Rgba([40, 40, 40, 255]));
                    tile.put_pixel(0, i, Rgba([40, 40, 40, 255]));
                }
                cache.insert_image(TileAddress::new(level, x, y), tile);
            }
        }
    }
    cache
}

fn demo(out: PathBuf) -> Result<()> {
    let config = MapConfig::default();
    let source = Arc::new(TileSource::mapnik());
    let view = Arc::new(MapView::new(source.clone(), &config)?);
    let zoom = 12;
    view.set_zoom_level(zoom)?;
    let start = view.map_center();

    let projection = view.projection();
    let cache = Arc::new(synthetic_cache(&config, &source, zoom, &projection.tile_at(start)));
    let layer = TilesLayer::new(cache).with_loading_colors(config.loading);

    let controller = MapController::new(view.clone(), config.animation);
    let target = WorldCoord::new(start.x + (600 << (18 - zoom)), start.y + (300 << (18 - zoom)));
    controller.animate_to_with(
        target,
        AnimationType::HalfCosine,
        30,
        Duration::from_millis(600),
    )?;

    let mut canvas = Canvas::new(640, 480);
    let mut frames = 0;
    let mut totals = DrawStats::default();
    while controller.is_pan_running() {
        canvas.fill([0, 0, 0, 0]);
        let stats = layer.draw_view(&mut canvas, &view.snapshot())?;
        totals.genuine += stats.genuine;
        totals.composite += stats.composite;
        totals.loading += stats.loading;
        frames += 1;
        std::thread::sleep(Duration::from_millis(16));
    }
    controller.join_pan()?;

    canvas.fill([0, 0, 0, 0]);
    layer.draw_view(&mut canvas, &view.snapshot())?;
    canvas
        .into_image()
        .save(&out)
        .with_context(|| format!("failed to save {}", out.display()))?;

    log::info!(
        "{} frames: {} genuine, {} composite, {} loading tile draws",
        frames,
        totals.genuine,
        totals.composite,
        totals.loading
    );
    println!("final frame written to {}", out.display());
    Ok(())
}

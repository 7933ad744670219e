use instapoints::compute::geojson::frame_to_feature_collection;
use instapoints::prelude::*;

const SAMPLE: &str = r#"[
    {"Latitude": -23.5505, "Longitude": -46.6333, "name": "Sao Paulo"},
    {"Latitude": -23.5614, "Longitude": -46.6559, "name": "Paulista"},
    {"Latitude": -23.5870, "Longitude": -46.6576, "name": "Ibirapuera"},
    {"Latitude": -22.9068, "Longitude": -43.1729, "name": "Rio de Janeiro"},
    {"Latitude": -22.9711, "Longitude": -43.1822, "name": "Copacabana"},
    {"Latitude": -15.7939, "Longitude": -47.8828, "name": "Brasilia"},
    {"Latitude": "n/a", "Longitude": -38.5, "name": "Unknown"},
    {"Latitude": 95.0, "Longitude": 10.0, "name": "Broken"}
]"#;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see detailed logs)
    env_logger::init();

    println!("=== Instapoints - Getting Started ===\n");

    // Pass a path to a JSON array of rows to use your own data
    let data = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };

    let (mut map, report) = MapBuilder::new()
        .pixel_radius(50.0)
        .viewport_size(1000, 600)
        .json_rows(data)
        .build_with_report()?;

    if let Some(report) = &report {
        if let Some(message) = report.empty_message() {
            println!("   {}", message);
            return Ok(());
        }
        println!(
            "1. Loaded {} point(s), skipped {} row(s)",
            report.loaded,
            report.skipped()
        );
        for rejection in &report.rejected {
            println!("     - point {}: {}", rejection.id, rejection.reason);
        }
    }

    print_frame("2. Initial view", &mut map);

    map.dispatch(MapEvent::ZoomBy(2));
    print_frame("3. Zoomed in by two levels", &mut map);

    let cluster = map
        .markers()
        .iter()
        .find(|marker| marker.is_cluster())
        .cloned();
    if let Some(cluster) = cluster {
        map.dispatch(MapEvent::MarkerClicked(cluster));
        print_frame("4. Clicked a cluster", &mut map);
    }

    let single = map
        .markers()
        .iter()
        .find(|marker| !marker.is_cluster())
        .cloned();
    if let Some(single) = single {
        for effect in map.apply(MapEvent::MarkerClicked(single)) {
            if let Effect::Popup(point) = effect {
                println!("5. Popup for point {}", point.id());
                for (key, value) in point.attributes() {
                    println!("     {}: {}", key, value);
                }
            }
        }
    }

    if let Some(frame) = map.frame() {
        println!("\n6. GeoJSON for the renderer:");
        println!("{}", frame_to_feature_collection(frame)?);
    }

    Ok(())
}

fn print_frame(title: &str, map: &mut MapController) {
    map.pump();
    let view = map.view();
    println!(
        "{} (zoom {}, center {:.4}, {:.4})",
        title, view.zoom, view.center_lat, view.center_lon
    );
    for marker in map.markers() {
        let position = marker.position();
        match marker {
            Marker::Cluster(cluster) => println!(
                "     cluster of {} at ({:.4}, {:.4})",
                cluster.count,
                position.y(),
                position.x()
            ),
            Marker::Single(single) => println!(
                "     point {} at ({:.4}, {:.4})",
                single.point.id(),
                position.y(),
                position.x()
            ),
        }
    }
    println!();
}

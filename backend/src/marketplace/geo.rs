use axent_common::marketplace::Equipment;
use axent_common::Coordinates;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Known cities, coastal Karnataka first.
pub const CITY_COORDINATES: &[(&str, Coordinates)] = &[
    ("Bhatkal", Coordinates { lat: 13.9857, lng: 74.5567 }),
    ("Mangalore", Coordinates { lat: 12.9141, lng: 74.8560 }),
    ("Udupi", Coordinates { lat: 13.3409, lng: 74.7421 }),
    ("Kundapura", Coordinates { lat: 13.6250, lng: 74.6892 }),
    ("Karwar", Coordinates { lat: 14.8138, lng: 74.1297 }),
    ("Bangalore", Coordinates { lat: 12.9716, lng: 77.5946 }),
    ("Mysore", Coordinates { lat: 12.2958, lng: 76.6394 }),
    ("Hubli", Coordinates { lat: 15.3647, lng: 75.1240 }),
    ("Belgaum", Coordinates { lat: 15.8497, lng: 74.4977 }),
    ("Davangere", Coordinates { lat: 14.4644, lng: 75.9218 }),
    ("Mumbai", Coordinates { lat: 19.0760, lng: 72.8777 }),
    ("Delhi", Coordinates { lat: 28.6139, lng: 77.2090 }),
    ("Pune", Coordinates { lat: 18.5204, lng: 73.8567 }),
    ("Hyderabad", Coordinates { lat: 17.3850, lng: 78.4867 }),
    ("Chennai", Coordinates { lat: 13.0827, lng: 80.2707 }),
    ("Kochi", Coordinates { lat: 9.9312, lng: 76.2673 }),
];

/// Great-circle distance in kilometres.
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// `"350 m"` under a kilometre, else `"12.3 km"`.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1} km", km)
    }
}

/// Exact, case-sensitive city lookup.
pub fn city_coordinates(city: &str) -> Option<Coordinates> {
    CITY_COORDINATES
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, coords)| *coords)
}

/// Nearest listings first.
pub fn sort_by_distance(items: &mut [Equipment], from: Coordinates) {
    items.sort_by(|a, b| {
        distance_km(from, a.location.coordinates).total_cmp(&distance_km(from, b.location.coordinates))
    });
}

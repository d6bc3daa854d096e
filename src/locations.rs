#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationProfile {
    pub name: &'static str,
    /// Seismic zone, 1 (least) to 5 (most active)
    pub seismic_zone: u8,
    /// Exposure to storm surge and coastal flooding, 0 to 1
    pub coastal_risk: f64,
    /// Typical people per square kilometre
    pub population_density: f64,
}

pub const DEFAULT_PROFILE: LocationProfile = LocationProfile {
    name: "Unknown",
    seismic_zone: 2,
    coastal_risk: 0.3,
    population_density: 1000.0,
};

pub const KNOWN_LOCATIONS: &[LocationProfile] = &[
    LocationProfile { name: "Mumbai", seismic_zone: 3, coastal_risk: 0.9, population_density: 20_000.0 },
    LocationProfile { name: "Delhi", seismic_zone: 4, coastal_risk: 0.0, population_density: 11_000.0 },
    LocationProfile { name: "Chennai", seismic_zone: 3, coastal_risk: 0.85, population_density: 14_000.0 },
    LocationProfile { name: "Kolkata", seismic_zone: 3, coastal_risk: 0.7, population_density: 24_000.0 },
    LocationProfile { name: "Bangalore", seismic_zone: 2, coastal_risk: 0.0, population_density: 4_400.0 },
    LocationProfile { name: "Hyderabad", seismic_zone: 2, coastal_risk: 0.0, population_density: 18_000.0 },
    LocationProfile { name: "Bhubaneswar", seismic_zone: 3, coastal_risk: 0.8, population_density: 2_100.0 },
    LocationProfile { name: "Kochi", seismic_zone: 3, coastal_risk: 0.75, population_density: 7_100.0 },
    LocationProfile { name: "Guwahati", seismic_zone: 5, coastal_risk: 0.0, population_density: 3_200.0 },
    LocationProfile { name: "Shimla", seismic_zone: 4, coastal_risk: 0.0, population_density: 5_000.0 },
    LocationProfile { name: "Dehradun", seismic_zone: 4, coastal_risk: 0.0, population_density: 2_000.0 },
    LocationProfile { name: "Srinagar", seismic_zone: 5, coastal_risk: 0.0, population_density: 5_600.0 },
];

pub fn profile_for(location: &str) -> LocationProfile {
    let wanted = location.trim();
    KNOWN_LOCATIONS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
        .copied()
        .unwrap_or(DEFAULT_PROFILE)
}

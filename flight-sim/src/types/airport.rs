use std::collections::HashMap;

use super::geo::Coordinates;

/// Represents an airport with its name, IATA code, geographical position, and country.
#[derive(Clone, Debug, PartialEq)]
pub struct Airport {
    pub iata_code: String,
    pub country: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    pub fn new(
        iata_code: String,
        country: String,
        name: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Airport {
            iata_code,
            country,
            name,
            latitude,
            longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Static reference table consulted when a flight is put in the air.
///
/// Implementations must be cheap and side-effect free; a miss is not an error
/// for the engine, which synthesizes a route instead.
pub trait AirportLookup: Send + Sync {
    fn lookup(&self, iata_code: &str) -> Option<Coordinates>;
}

impl AirportLookup for HashMap<String, Airport> {
    fn lookup(&self, iata_code: &str) -> Option<Coordinates> {
        let code = iata_code.trim().to_uppercase();
        if code.is_empty() {
            return None;
        }
        self.get(&code).map(Airport::coordinates)
    }
}

/// Builds the default airport table keyed by IATA code.
pub fn catalog() -> HashMap<String, Airport> {
    AIRPORTS
        .iter()
        .map(|(iata_code, country, name, latitude, longitude)| {
            (
                iata_code.to_string(),
                Airport::new(
                    iata_code.to_string(),
                    country.to_string(),
                    name.to_string(),
                    *latitude,
                    *longitude,
                ),
            )
        })
        .collect()
}

// (iata, country, name, lat, lng)
const AIRPORTS: &[(&str, &str, &str, f64, f64)] = &[
    ("MAD", "ESP", "Madrid-Barajas", 40.4719, -3.5626),
    ("BCN", "ESP", "Barcelona-El Prat", 41.2974, 2.0833),
    ("AGP", "ESP", "Málaga-Costa del Sol", 36.6749, -4.4991),
    ("PMI", "ESP", "Palma de Mallorca", 39.5517, 2.7388),
    ("VLC", "ESP", "Valencia", 39.4893, -0.4817),
    ("BIO", "ESP", "Bilbao", 43.3011, -2.9106),
    ("SVQ", "ESP", "Sevilla", 37.4180, -5.8931),
    ("LHR", "GBR", "London Heathrow", 51.4700, -0.4543),
    ("LGW", "GBR", "London Gatwick", 51.1537, -0.1821),
    ("MAN", "GBR", "Manchester", 53.3537, -2.2750),
    ("EDI", "GBR", "Edinburgh", 55.9500, -3.3725),
    ("STN", "GBR", "London Stansted", 51.8850, 0.2350),
    ("LTN", "GBR", "London Luton", 51.8747, -0.3683),
    ("BHX", "GBR", "Birmingham", 52.4539, -1.7480),
    ("GLA", "GBR", "Glasgow", 55.8719, -4.4331),
    ("CDG", "FRA", "Paris Charles de Gaulle", 49.0097, 2.5479),
    ("ORY", "FRA", "Paris Orly", 48.7233, 2.3794),
    ("NCE", "FRA", "Nice Côte d'Azur", 43.6584, 7.2159),
    ("LYS", "FRA", "Lyon-Saint Exupéry", 45.7256, 5.0811),
    ("MRS", "FRA", "Marseille", 43.4393, 5.2214),
    ("TLS", "FRA", "Toulouse", 43.6290, 1.3638),
    ("BOD", "FRA", "Bordeaux", 44.8283, -0.7153),
    ("NTE", "FRA", "Nantes", 47.1532, -1.6107),
    ("FRA", "DEU", "Frankfurt", 50.0379, 8.5622),
    ("MUC", "DEU", "Munich", 48.3537, 11.7750),
    ("BER", "DEU", "Berlin Brandenburg", 52.3667, 13.5033),
    ("HAM", "DEU", "Hamburg", 53.6304, 9.9882),
    ("DUS", "DEU", "Düsseldorf", 51.2895, 6.7668),
    ("CGN", "DEU", "Cologne", 50.8659, 7.1427),
    ("STR", "DEU", "Stuttgart", 48.6899, 9.2220),
    ("AMS", "NLD", "Amsterdam Schiphol", 52.3105, 4.7683),
    ("FCO", "ITA", "Rome Fiumicino", 41.8003, 12.2389),
    ("MXP", "ITA", "Milan Malpensa", 45.6306, 8.7281),
    ("VCE", "ITA", "Venice Marco Polo", 45.5053, 12.3519),
    ("NAP", "ITA", "Naples", 40.8860, 14.2908),
    ("LIN", "ITA", "Milan Linate", 45.4454, 9.2765),
    ("BGY", "ITA", "Bergamo", 45.6739, 9.7042),
    ("CIA", "ITA", "Rome Ciampino", 41.7994, 12.5949),
    ("BLQ", "ITA", "Bologna", 44.5354, 11.2887),
    ("ZRH", "CHE", "Zurich", 47.4647, 8.5492),
    ("GVA", "CHE", "Geneva", 46.2381, 6.1090),
    ("BSL", "CHE", "Basel", 47.5900, 7.5292),
    ("VIE", "AUT", "Vienna", 48.1103, 16.5697),
    ("BRU", "BEL", "Brussels", 50.9010, 4.4856),
    ("CRL", "BEL", "Brussels Charleroi", 50.4592, 4.4538),
    ("CPH", "DNK", "Copenhagen", 55.6180, 12.6508),
    ("OSL", "NOR", "Oslo Gardermoen", 60.1939, 11.1004),
    ("BGO", "NOR", "Bergen", 60.2934, 5.2181),
    ("ARN", "SWE", "Stockholm Arlanda", 59.6519, 17.9186),
    ("GOT", "SWE", "Gothenburg", 57.6628, 12.2798),
    ("MMX", "SWE", "Malmö", 55.5364, 13.3761),
    ("LIS", "PRT", "Lisbon", 38.7742, -9.1342),
    ("OPO", "PRT", "Porto", 41.2481, -8.6814),
    ("FAO", "PRT", "Faro", 37.0144, -7.9659),
    ("ATH", "GRC", "Athens", 37.9364, 23.9445),
    ("HER", "GRC", "Heraklion", 35.3397, 25.1803),
    ("SKG", "GRC", "Thessaloniki", 40.5197, 22.9708),
    ("WAW", "POL", "Warsaw", 52.1657, 20.9671),
    ("KRK", "POL", "Krakow", 50.0777, 19.7848),
    ("PRG", "CZE", "Prague", 50.1008, 14.2600),
    ("BUD", "HUN", "Budapest", 47.4299, 19.2611),
    ("DUB", "IRL", "Dublin", 53.4213, -6.2701),
    ("ORK", "IRL", "Cork", 51.8413, -8.4911),
    ("HEL", "FIN", "Helsinki", 60.3172, 24.9633),
    ("IST", "TUR", "Istanbul", 41.2753, 28.7519),
    ("SAW", "TUR", "Istanbul Sabiha Gökçen", 40.8986, 29.3092),
    ("AYT", "TUR", "Antalya", 36.8987, 30.8005),
    ("ESB", "TUR", "Ankara", 40.1281, 32.9951),
    ("DXB", "ARE", "Dubai", 25.2532, 55.3657),
    ("DOH", "QAT", "Doha", 25.2731, 51.6080),
    ("AUH", "ARE", "Abu Dhabi", 24.4330, 54.6511),
    ("AMM", "JOR", "Amman", 31.7226, 35.9932),
    ("CAI", "EGY", "Cairo", 30.1219, 31.4056),
    ("TLV", "ISR", "Tel Aviv", 32.0114, 34.8867),
    ("BEY", "LBN", "Beirut", 33.8209, 35.4884),
    ("DEL", "IND", "Delhi", 28.5562, 77.1000),
    ("BOM", "IND", "Mumbai", 19.0896, 72.8656),
    ("BLR", "IND", "Bangalore", 13.1986, 77.7066),
    ("SIN", "SGP", "Singapore", 1.3644, 103.9915),
    ("HKG", "HKG", "Hong Kong", 22.3080, 113.9185),
    ("BKK", "THA", "Bangkok", 13.6900, 100.7501),
    ("KUL", "MYS", "Kuala Lumpur", 2.7456, 101.7099),
    ("CGK", "IDN", "Jakarta", -6.1256, 106.6559),
    ("MNL", "PHL", "Manila", 14.5086, 121.0194),
    ("ICN", "KOR", "Seoul Incheon", 37.4602, 126.4407),
    ("NRT", "JPN", "Tokyo Narita", 35.7720, 140.3929),
    ("HND", "JPN", "Tokyo Haneda", 35.5494, 139.7798),
    ("PEK", "CHN", "Beijing", 40.0799, 116.6031),
    ("PVG", "CHN", "Shanghai Pudong", 31.1443, 121.8083),
    ("JFK", "USA", "New York JFK", 40.6413, -73.7781),
    ("LGA", "USA", "New York LaGuardia", 40.7769, -73.8740),
    ("EWR", "USA", "Newark", 40.6895, -74.1745),
    ("LAX", "USA", "Los Angeles", 33.9416, -118.4085),
    ("SFO", "USA", "San Francisco", 37.6213, -122.3790),
    ("ORD", "USA", "Chicago O'Hare", 41.9742, -87.9073),
    ("MIA", "USA", "Miami", 25.7959, -80.2870),
    ("ATL", "USA", "Atlanta", 33.6407, -84.4277),
    ("DFW", "USA", "Dallas Fort Worth", 32.8998, -97.0403),
    ("IAH", "USA", "Houston", 29.9902, -95.3368),
    ("DEN", "USA", "Denver", 39.8561, -104.6737),
    ("SEA", "USA", "Seattle", 47.4502, -122.3088),
    ("PHX", "USA", "Phoenix", 33.4352, -112.0101),
    ("LAS", "USA", "Las Vegas", 36.0840, -115.1537),
    ("MCO", "USA", "Orlando", 28.4312, -81.3081),
    ("BOS", "USA", "Boston", 42.3656, -71.0096),
    ("YYZ", "CAN", "Toronto", 43.6777, -79.6248),
    ("YVR", "CAN", "Vancouver", 49.1947, -123.1839),
    ("YUL", "CAN", "Montreal", 45.4657, -73.7455),
    ("MEX", "MEX", "Mexico City", 19.4363, -99.0721),
    ("CUN", "MEX", "Cancun", 21.0365, -86.8771),
    ("GDL", "MEX", "Guadalajara", 20.5218, -103.3119),
    ("BOG", "COL", "Bogotá", 4.7016, -74.1469),
    ("LIM", "PER", "Lima", -12.0219, -77.1143),
    ("SCL", "CHL", "Santiago", -33.3930, -70.7858),
    ("GRU", "BRA", "São Paulo", -23.4356, -46.4731),
    ("GIG", "BRA", "Rio de Janeiro", -22.8099, -43.2505),
    ("EZE", "ARG", "Buenos Aires", -34.8222, -58.5358),
    ("CPT", "ZAF", "Cape Town", -33.9715, 18.6021),
    ("JNB", "ZAF", "Johannesburg", -26.1392, 28.2460),
    ("NBO", "KEN", "Nairobi", -1.3192, 36.9278),
    ("ADD", "ETH", "Addis Ababa", 8.9806, 38.7991),
    ("LOS", "NGA", "Lagos", 6.5774, 3.3212),
    ("ALG", "DZA", "Algiers", 36.6910, 3.2154),
    ("CMN", "MAR", "Casablanca", 33.3675, -7.5898),
    ("TUN", "TUN", "Tunis", 36.8510, 10.2272),
    ("SYD", "AUS", "Sydney", -33.9399, 151.1753),
    ("MEL", "AUS", "Melbourne", -37.6690, 144.8410),
    ("BNE", "AUS", "Brisbane", -27.3942, 153.1218),
    ("PER", "AUS", "Perth", -31.9403, 115.9672),
    ("AKL", "NZL", "Auckland", -37.0082, 174.7850),
];

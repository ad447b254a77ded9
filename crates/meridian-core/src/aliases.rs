//! Non-IANA zone names mapped to IANA zones.
//!
//! Two tables: Windows display names (`Pakistan Standard Time`) and legacy
//! names still emitted by some geocoding services (`Asia/Calcutta`). Both
//! are plain immutable data handed to the resolver at construction.

use std::collections::BTreeMap;

/// Windows time-zone names and the IANA zone that best matches each.
const WINDOWS_TO_IANA: &[(&str, &str)] = &[
    ("Dateline Standard Time", "Etc/GMT-12"),
    ("Samoa Standard Time", "Pacific/Pago_Pago"),
    ("Hawaiian Standard Time", "Pacific/Honolulu"),
    // Alaska has several zones; Anchorage stands in for all of them.
    ("Alaskan Standard Time", "America/Anchorage"),
    ("Pacific Standard Time", "America/Los_Angeles"),
    ("Mountain Standard Time", "America/Denver"),
    ("Mexico Standard Time 2", "America/Chihuahua"),
    ("U.S. Mountain Standard Time", "America/Phoenix"),
    ("Central Standard Time", "America/Chicago"),
    ("Canada Central Standard Time", "America/Yellowknife"),
    ("Mexico Standard Time", "America/Mexico_City"),
    ("Central America Standard Time", "America/Merida"),
    ("Eastern Standard Time", "America/New_York"),
    ("U.S. Eastern Standard Time", "America/Indiana/Indianapolis"),
    ("S.A. Pacific Standard Time", "America/Bogota"),
    ("Atlantic Standard Time", "America/Halifax"),
    ("S.A. Western Standard Time", "America/Argentina/San_Juan"),
    ("Pacific S.A. Standard Time", "America/Santiago"),
    ("Newfoundland and Labrador Standard Time", "America/St_Johns"),
    ("E. South America Standard Time", "America/Sao_Paulo"),
    ("S.A. Eastern Standard Time", "America/Guyana"),
    ("Greenland Standard Time", "America/Godthab"),
    ("Mid-Atlantic Standard Time", "Etc/GMT-2"),
    ("Azores Standard Time", "Atlantic/Azores"),
    ("Cape Verde Standard Time", "Atlantic/Cape_Verde"),
    ("GMT Standard Time", "Etc/GMT"),
    ("Greenwich Standard Time", "Atlantic/Reykjavik"),
    ("Central Europe Standard Time", "Europe/Belgrade"),
    ("Central European Standard Time", "Europe/Warsaw"),
    ("Romance Standard Time", "Europe/Brussels"),
    ("W. Europe Standard Time", "Europe/Amsterdam"),
    ("W. Central Africa Standard Time", "Africa/Algiers"),
    ("E. Europe Standard Time", "Europe/Minsk"),
    ("Egypt Standard Time", "Africa/Cairo"),
    ("FLE Standard Time", "Europe/Helsinki"),
    ("GTB Standard Time", "Europe/Athens"),
    ("Israel Standard Time", "Asia/Jerusalem"),
    ("South Africa Standard Time", "Africa/Johannesburg"),
    ("Russian Standard Time", "Europe/Moscow"),
    ("Arab Standard Time", "Asia/Riyadh"),
    ("E. Africa Standard Time", "Africa/Nairobi"),
    ("Arabic Standard Time", "Asia/Baghdad"),
    ("Iran Standard Time", "Asia/Tehran"),
    ("Arabian Standard Time", "Asia/Dubai"),
    ("Caucasus Standard Time", "Asia/Yerevan"),
    ("Transitional Islamic State of Afghanistan Standard Time", "Asia/Kabul"),
    ("Ekaterinburg Standard Time", "Asia/Yekaterinburg"),
    ("West Asia Standard Time", "Asia/Tashkent"),
    ("India Standard Time", "Asia/Kolkata"),
    ("Nepal Standard Time", "Asia/Kathmandu"),
    ("Central Asia Standard Time", "Asia/Dhaka"),
    ("Sri Lanka Standard Time", "Asia/Colombo"),
    ("N. Central Asia Standard Time", "Asia/Novosibirsk"),
    ("Myanmar Standard Time", "Asia/Yangon"),
    ("S.E. Asia Standard Time", "Asia/Bangkok"),
    ("North Asia Standard Time", "Asia/Krasnoyarsk"),
    ("China Standard Time", "Asia/Shanghai"),
    ("Singapore Standard Time", "Asia/Singapore"),
    ("Taipei Standard Time", "Asia/Taipei"),
    ("W. Australia Standard Time", "Australia/Perth"),
    ("North Asia East Standard Time", "Asia/Irkutsk"),
    ("Korea Standard Time", "Asia/Seoul"),
    ("Tokyo Standard Time", "Asia/Tokyo"),
    ("Yakutsk Standard Time", "Asia/Yakutsk"),
    ("A.U.S. Central Standard Time", "Australia/Darwin"),
    ("Cen. Australia Standard Time", "Australia/Adelaide"),
    ("A.U.S. Eastern Standard Time", "Australia/Sydney"),
    ("E. Australia Standard Time", "Australia/Brisbane"),
    ("Tasmania Standard Time", "Australia/Hobart"),
    ("Vladivostok Standard Time", "Asia/Vladivostok"),
    ("West Pacific Standard Time", "Pacific/Guam"),
    ("Central Pacific Standard Time", "Asia/Magadan"),
    ("Fiji Islands Standard Time", "Pacific/Fiji"),
    ("New Zealand Standard Time", "Pacific/Auckland"),
    ("Tonga Standard Time", "Pacific/Tongatapu"),
    ("Azerbaijan Standard Time", "Asia/Baku"),
    ("Middle East Standard Time", "Asia/Beirut"),
    ("Jordan Standard Time", "Asia/Amman"),
    ("Namibia Standard Time", "Africa/Windhoek"),
    ("Georgian Standard Time", "Asia/Tbilisi"),
    ("Central Brazilian Standard Time", "America/Manaus"),
    ("Montevideo Standard Time", "America/Montevideo"),
    ("Armenian Standard Time", "Asia/Yerevan"),
    ("Venezuela Standard Time", "America/Caracas"),
    ("Argentina Standard Time", "America/Argentina/Buenos_Aires"),
    ("Morocco Standard Time", "Africa/Casablanca"),
    ("Pakistan Standard Time", "Asia/Karachi"),
    ("Mauritius Standard Time", "Indian/Mauritius"),
    ("UTC", "Etc/UTC"),
    ("Paraguay Standard Time", "America/Asuncion"),
    ("Kamchatka Standard Time", "Asia/Kamchatka"),
];

/// Legacy and vendor-specific zone names and their IANA replacement.
const LEGACY_TO_IANA: &[(&str, &str)] = &[
    ("Antarctica/South_Pole", "Antarctica/Mawson"),
    ("America/Buenos_Aires", "America/Argentina/Buenos_Aires"),
    ("America/Cordoba", "America/Argentina/Cordoba"),
    ("America/Jujuy", "America/Argentina/Jujuy"),
    ("America/Catamarca", "America/Argentina/Catamarca"),
    ("America/Mendoza", "America/Argentina/Mendoza"),
    ("America/Coral_Harbour", "America/Atikokan"),
    ("Pacific/Ponape", "Pacific/Pohnpei"),
    ("Atlantic/Faeroe", "Atlantic/Faroe"),
    ("Asia/Calcutta", "Asia/Kolkata"),
    ("Asia/Rangoon", "Asia/Yangon"),
    ("Asia/Katmandu", "Asia/Kathmandu"),
    ("Asia/Saigon", "Asia/Ho_Chi_Minh"),
    ("Africa/Niamey", "Africa/Lagos"),
    ("Africa/Dar_es_Salaam", "Africa/Nairobi"),
    ("Africa/Luanda", "Africa/Lagos"),
    ("Africa/Addis_Ababa", "Africa/Nairobi"),
    ("Africa/Douala", "Africa/Lagos"),
    ("Africa/Porto-Novo", "Africa/Lagos"),
    ("Africa/Nouakchott", "Africa/Abidjan"),
    ("Africa/Lubumbashi", "Africa/Maputo"),
    ("Europe/Bratislava", "Europe/Budapest"),
    ("Africa/Bangui", "Africa/Lagos"),
    ("Africa/Conakry", "Africa/Abidjan"),
    ("Africa/Gaborone", "Africa/Maputo"),
    ("Europe/Skopje", "Europe/Belgrade"),
    ("Africa/Blantyre", "Africa/Maputo"),
    ("Africa/Lusaka", "Africa/Maputo"),
    ("Africa/Asmera", "Africa/Nairobi"),
    ("Arctic/Longyearbyen", "Europe/Oslo"),
    ("Africa/Harare", "Africa/Maputo"),
    ("Asia/Phnom_Penh", "Asia/Bangkok"),
    ("Africa/Bamako", "Africa/Abidjan"),
    ("Africa/Brazzaville", "Africa/Lagos"),
    ("Africa/Mogadishu", "Africa/Nairobi"),
    ("Africa/Libreville", "Africa/Lagos"),
    ("Africa/Kinshasa", "Africa/Lagos"),
    ("Indian/Antananarivo", "Africa/Nairobi"),
    ("Africa/Ouagadougou", "Africa/Abidjan"),
    ("Africa/Kampala", "Africa/Nairobi"),
    ("Asia/Vientiane", "Asia/Bangkok"),
    ("Asia/Aden", "Asia/Riyadh"),
    ("Africa/Dakar", "Africa/Abidjan"),
    ("Asia/Muscat", "Asia/Dubai"),
    ("Africa/Freetown", "Africa/Abidjan"),
    ("Europe/Ljubljana", "Europe/Belgrade"),
    ("Europe/Sarajevo", "Europe/Belgrade"),
    ("Europe/Zagreb", "Europe/Belgrade"),
    ("Europe/Mariehamn", "Europe/Helsinki"),
    ("Indian/Comoro", "Africa/Nairobi"),
    ("America/St_Thomas", "America/Port_of_Spain"),
    ("Africa/Djibouti", "Africa/Nairobi"),
    ("Africa/Bujumbura", "Africa/Maputo"),
    ("Africa/Maseru", "Africa/Johannesburg"),
    ("Africa/Banjul", "Africa/Abidjan"),
    ("Africa/Kigali", "Africa/Maputo"),
    ("Africa/Malabo", "Africa/Lagos"),
    ("Africa/Lome", "Africa/Abidjan"),
    ("Asia/Bahrain", "Asia/Qatar"),
    ("Asia/Kuwait", "Asia/Riyadh"),
    ("America/Montserrat", "America/Port_of_Spain"),
    ("Africa/Mbabane", "Africa/Johannesburg"),
    ("Europe/Podgorica", "Europe/Belgrade"),
    ("America/Antigua", "America/Port_of_Spain"),
];

/// Immutable alias tables consulted before the zone database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneAliases {
    windows: BTreeMap<String, String>,
    legacy: BTreeMap<String, String>,
}

impl ZoneAliases {
    /// Tables with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in Windows and legacy-name tables.
    pub fn builtin() -> Self {
        Self::new(
            WINDOWS_TO_IANA.iter().copied(),
            LEGACY_TO_IANA.iter().copied(),
        )
    }

    /// Build tables from `(alias, zone)` pairs. A repeated alias keeps its
    /// last mapping.
    pub fn new<'a>(
        windows: impl IntoIterator<Item = (&'a str, &'a str)>,
        legacy: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            windows: owned_table(windows),
            legacy: owned_table(legacy),
        }
    }

    /// IANA zone for a Windows time-zone name.
    pub fn windows_to_iana(&self, windows_name: &str) -> Option<&str> {
        self.windows.get(windows_name).map(String::as_str)
    }

    /// IANA zone for a legacy or vendor-specific zone name.
    pub fn legacy_to_iana(&self, legacy_name: &str) -> Option<&str> {
        self.legacy.get(legacy_name).map(String::as_str)
    }

    /// Look `name` up in the Windows table, then the legacy table.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.windows_to_iana(name)
            .or_else(|| self.legacy_to_iana(name))
    }

    /// Number of entries across both tables.
    pub fn len(&self) -> usize {
        self.windows.len().saturating_add(self.legacy.len())
    }

    /// Whether both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty() && self.legacy.is_empty()
    }
}

fn owned_table<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(alias, zone)| (alias.to_owned(), zone.to_owned()))
        .collect()
}

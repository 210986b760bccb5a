//! Static keyword tables: region terms, cities, landmarks and category keywords.
//!
//! All keywords are lowercase. Landmark and category keywords are plain
//! substrings of the lowercased text. Region and city keywords are regex
//! fragments anchored at a word start, so most are stems that survive Russian
//! declension ("кондопог" matches "Кондопога", "Кондопоге", "Кондопогой").
//! Names that collide with common words or surnames are spelled out as exact
//! forms instead of stems.

use crate::classify::Category;

/// Primary city of the region. Default place and geocoding municipality.
pub const PRIMARY_CITY: &str = "Петрозаводск";

/// A city or town with its fixed coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub lon: f64,
    pub lat: f64,
}

/// A sub-city point of interest inside the primary city.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub lon: f64,
    pub lat: f64,
}

/// Cities in scan order. The first hit wins, so the primary city comes first.
pub const CITIES: &[City] = &[
    City {
        name: "Петрозаводск",
        keywords: &["петрозаводск"],
        lon: 34.3469,
        lat: 61.7849,
    },
    City {
        name: "Кондопога",
        keywords: &["кондопог"],
        lon: 33.9272,
        lat: 62.2167,
    },
    City {
        name: "Сортавала",
        keywords: &["сортавал"],
        lon: 30.7031,
        lat: 61.7167,
    },
    City {
        name: "Кемь",
        keywords: &["кемь\\b", "в кеми\\b", "кемск(?:ий|ого|ом)\\b"],
        lon: 34.5956,
        lat: 64.9444,
    },
    City {
        name: "Беломорск",
        keywords: &["беломорск"],
        lon: 34.4667,
        lat: 64.5222,
    },
    City {
        name: "Лоухи",
        keywords: &["лоух"],
        lon: 32.3500,
        lat: 65.7333,
    },
    City {
        name: "Медвежьегорск",
        keywords: &["медвежьегорск"],
        lon: 34.4500,
        lat: 62.9333,
    },
    City {
        name: "Сегежа",
        keywords: &["сегеж"],
        lon: 34.2833,
        lat: 62.5167,
    },
    City {
        name: "Питкяранта",
        keywords: &["питкярант"],
        lon: 30.6500,
        lat: 61.4000,
    },
    City {
        name: "Суоярви",
        keywords: &["суоярв"],
        lon: 30.9000,
        lat: 62.1667,
    },
    City {
        name: "Олонец",
        keywords: &["олонец", "олонц"],
        lon: 32.3667,
        lat: 60.9833,
    },
    City {
        name: "Пряжа",
        // "пряжа" alone is also yarn, "пряжка" a buckle.
        keywords: &["пряжинск", "(?:в|до|под) пряж(?:е|и|ей)\\b"],
        lon: 33.3500,
        lat: 61.2500,
    },
    City {
        name: "Пудож",
        keywords: &["пудож"],
        lon: 36.8500,
        lat: 61.9000,
    },
    City {
        name: "Лахденпохья",
        keywords: &["лахденпох"],
        lon: 29.9667,
        lat: 61.0500,
    },
];

/// Region name and administrative subdivisions. City stems are added on top of
/// these by [`region_keywords`].
pub const REGION_TERMS: &[&str] = &[
    "карели(?:я|и|ю|ей)\\b",
    "карельск",
    "онежск",
    "ладожск",
    "кижи",
    "валаам",
    "прионежск",
    "калевальск",
    "муезерск",
    "костомукш",
    "заонеж",
    // Шуя alone is also a town in Ivanovo Oblast.
    "шуйск(?:ая|ой|ую) чуп",
];

/// Landmarks inside the primary city with fixed coordinates.
pub const LANDMARKS: &[Landmark] = &[
    Landmark {
        name: "Онежская набережная",
        keywords: &["онежская набережная", "онежской набережной", "онежскую набережную"],
        lon: 34.3560,
        lat: 61.7930,
    },
    Landmark {
        name: "Правительство Карелии",
        keywords: &["правительство карелии", "правительства карелии", "здание правительства"],
        lon: 34.3686,
        lat: 61.7872,
    },
    Landmark {
        name: "Законодательное собрание",
        keywords: &["законодательное собрание", "законодательного собрания", "заксобрани"],
        lon: 34.3623,
        lat: 61.7865,
    },
    Landmark {
        name: "Национальный театр Карелии",
        keywords: &["национальный театр", "национального театра", "национальном театре"],
        lon: 34.3708,
        lat: 61.7920,
    },
    Landmark {
        name: "Музыкальный театр",
        keywords: &["музыкальный театр", "музыкального театра", "музыкальном театре"],
        lon: 34.3603,
        lat: 61.7889,
    },
    Landmark {
        name: "Стадион «Спартак»",
        keywords: &[
            "стадион \"спартак\"",
            "стадионе \"спартак\"",
            "стадион спартак",
            "стадионе спартак",
        ],
        lon: 34.3677,
        lat: 61.7837,
    },
    Landmark {
        name: "ПетрГУ",
        keywords: &[
            "петргу",
            "петрозаводский государственный университет",
            "петрозаводского государственного университета",
        ],
        lon: 34.3523,
        lat: 61.7862,
    },
    Landmark {
        name: "Железнодорожный вокзал",
        keywords: &[
            "жд вокзал",
            "ж/д вокзал",
            "железнодорожный вокзал",
            "железнодорожного вокзала",
            "железнодорожном вокзале",
        ],
        lon: 34.3522,
        lat: 61.7838,
    },
    Landmark {
        name: "Площадь Ленина",
        keywords: &["площадь ленина", "площади ленина", "круглая площадь", "круглой площади"],
        lon: 34.3546,
        lat: 61.7856,
    },
    Landmark {
        name: "Площадь Кирова",
        keywords: &["площадь кирова", "площади кирова"],
        lon: 34.3612,
        lat: 61.7894,
    },
];

/// Category keyword sets in fixed precedence order; the first hit wins.
pub const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Politics,
        &[
            "выборы",
            "правительство",
            "администрация",
            "губернатор",
            "депутат",
            "закон",
            "парламент",
        ],
    ),
    (
        Category::Crime,
        &["задержан", "кража", "дтп", "пожар", "преступление", "полиция", "суд", "уголовное"],
    ),
    (
        Category::Culture,
        &["выставка", "концерт", "музей", "фестиваль", "театр", "библиотека", "кино", "искусство"],
    ),
    (
        Category::Economy,
        &["экономика", "бизнес", "инвестиции", "производство", "завод", "предприятие", "торговля"],
    ),
    (
        Category::Sports,
        &["спорт", "чемпионат", "матч", "турнир", "стадион", "футбол", "хоккей", "лыжи"],
    ),
    (
        Category::Science,
        &["наука", "исследование", "университет", "академия", "лаборатория", "профессор"],
    ),
    (
        Category::Accidents,
        &["авария", "катастрофа", "чп", "пожар", "утечка", "обрушение", "аварийные"],
    ),
    (
        Category::Infrastructure,
        &["дорога", "ремонт", "теплотрасса", "светофор", "мост", "трубопровод", "электросети"],
    ),
];

/// Full relevance keyword list: region terms followed by every city keyword.
pub fn region_keywords() -> impl Iterator<Item = &'static str> {
    REGION_TERMS
        .iter()
        .copied()
        .chain(CITIES.iter().flat_map(|c| c.keywords.iter().copied()))
}

/// Look up a city by its display name.
pub fn city(name: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.name == name)
}

/// The primary city's entry.
pub fn primary_city() -> &'static City {
    &CITIES[0]
}

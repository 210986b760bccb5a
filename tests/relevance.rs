// tests/relevance.rs
//
// Hand-picked headlines for the regional relevance gate.

use karelia_news::relevance::{detect_city, is_relevant, matched_keywords};

#[test]
fn regional_headlines_pass() {
    let cases = [
        "В Петрозаводске открыли новый сквер",
        "Губернатор Карелии подписал указ",
        "ДТП под Сортавалой: пострадавших нет",
        "Туристы вернулись на Валаам",
        "КАРЕЛЬСКИЙ хоккей: итоги сезона",
        "В Прионежском районе отремонтируют дорогу",
        "Дорогу в Шуйской Чупе отремонтируют",
        "В Пряже открыли новую школу",
        "Пряжинский район готовится к зиме",
    ];
    for text in cases {
        assert!(is_relevant(text), "expected relevant: {text}");
    }
}

#[test]
fn foreign_headlines_fail() {
    let cases = [
        "Курс доллара вырос",
        "В Москве прошёл снегопад",
        "Новый смартфон представлен в Сеуле",
        "",
    ];
    for text in cases {
        assert!(!is_relevant(text), "expected irrelevant: {text}");
    }
}

#[test]
fn lookalike_names_from_elsewhere_fail() {
    let cases = [
        "Александр Карелин выступил в Госдуме",
        "В Шуя Ивановской области открыли завод",
        "Пряжка ремня стала хитом продаж в Москве",
        "Царь Василий Шуйский: новая книга",
        "Шарф из пряжи за один вечер",
    ];
    for text in cases {
        assert!(!is_relevant(text), "expected irrelevant: {text}");
    }
}

#[test]
fn matched_keywords_lists_every_hit() {
    let hits = matched_keywords("Из Петрозаводска в Кондопогу пустят автобус по Карелии");
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().any(|kw| kw.starts_with("карели")));
    assert!(hits.contains(&"петрозаводск"));
    assert!(hits.contains(&"кондопог"));
}

#[test]
fn city_detection_follows_list_order() {
    assert_eq!(detect_city("Новости Кондопоги").map(|c| c.name), Some("Кондопога"));
    assert_eq!(
        detect_city("Из Кондопоги в Петрозаводск").map(|c| c.name),
        Some("Петрозаводск")
    );
    assert!(detect_city("Новости Карелии").is_none());
}

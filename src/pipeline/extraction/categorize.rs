use super::language_detect::normalize_romanian;
use super::types::Category;

/// Keywords for one category, matched as plain substrings of the
/// lower-cased text.
struct KeywordTable {
    category: Category,
    keywords: &'static [&'static str],
}

/// Evaluated in order; the first table with a hit decides the category.
const KEYWORD_TABLES: &[KeywordTable] = &[
    KeywordTable {
        category: Category::Work,
        keywords: &[
            "work", "meeting", "call", "project", "deadline", "presentation", "client",
            "email", "report", "document", "office", "boss", "colleague", "muncă", "munca",
            "întâlnire", "intalnire", "apel", "proiect", "prezentare", "raport", "birou",
            "șef", "coleg",
        ],
    },
    KeywordTable {
        category: Category::Family,
        keywords: &[
            "family", "kid", "child", "parent", "mom", "dad", "school", "homework", "house",
            "home", "clean", "cook", "dinner", "lunch", "breakfast", "familie", "copil",
            "copii", "părinte", "parinte", "mama", "tata", "școală", "scoala", "temă",
            "casă", "acasă", "curăț", "gătit", "cină", "prânz", "mic dejun",
        ],
    },
    KeywordTable {
        category: Category::Shopping,
        keywords: &[
            "buy", "purchase", "shop", "store", "groceries", "market", "mall", "order",
            "deliver", "amazon", "online", "cumpăr", "cumpar", "achiziție", "magazin",
            "cumpărături", "piață", "piata", "comandă", "livrare", "fructe", "legume",
        ],
    },
    KeywordTable {
        category: Category::Health,
        keywords: &[
            "doctor", "appointment", "medicine", "prescription", "health", "medical",
            "workout", "exercise", "gym", "fitness", "dentist", "hospital", "medic",
            "programare", "medicament", "rețetă", "sănătate", "antrenament", "exercițiu",
            "sală", "spital", "farmacie",
        ],
    },
    KeywordTable {
        category: Category::Finance,
        keywords: &[
            "pay", "bill", "invoice", "money", "bank", "account", "tax", "payment",
            "finance", "budget", "salary", "debt", "loan", "plată", "plăt", "factur",
            "bani", "bancă", "contul", "taxă", "impozit", "finanțe", "buget", "salariu",
            "datorie", "împrumut", "chirie",
        ],
    },
    KeywordTable {
        category: Category::Travel,
        keywords: &[
            "trip", "travel", "flight", "airport", "hotel", "vacation", "booking", "car",
            "drive", "bus", "train", "ticket", "reservation", "călătorie", "zbor",
            "aeroport", "vacanță", "rezervare", "mașină", "masina", "autobuz", "tren",
            "bilet",
        ],
    },
    KeywordTable {
        category: Category::Social,
        keywords: &[
            "party", "event", "birthday", "celebration", "friend", "drink", "bar",
            "restaurant", "concert", "movie", "theater", "petrecere", "eveniment",
            "ziua de naștere", "sărbătoare", "prieten", "băutură", "film", "teatru",
        ],
    },
    KeywordTable {
        category: Category::Study,
        keywords: &[
            "study", "learn", "course", "class", "lecture", "exam", "test", "assignment",
            "book", "read", "research", "paper", "studiu", "învăța", "curs", "clasă",
            "lecție", "examen", "carte", "citit", "cercetare", "lucrare",
        ],
    },
];

/// Explicit markers consulted only when no keyword table matched.
const OVERRIDES: &[(&str, Category)] = &[
    ("work", Category::Work),
    ("home", Category::Family),
    ("shop", Category::Shopping),
    ("health", Category::Health),
    ("finance", Category::Finance),
    ("travel", Category::Travel),
    ("social", Category::Social),
    ("study", Category::Study),
];

/// Assign a category: first keyword table with a substring hit, then
/// `#tag` / `(tag)` overrides, then `General`.
pub fn categorize(text: &str) -> Category {
    let lower = normalize_romanian(text);

    if let Some(table) = KEYWORD_TABLES
        .iter()
        .find(|table| table.keywords.iter().any(|keyword| lower.contains(keyword)))
    {
        return table.category;
    }

    for (tag, category) in OVERRIDES {
        if lower.contains(&format!("#{tag}")) || lower.contains(&format!("({tag})")) {
            return *category;
        }
    }

    Category::General
}

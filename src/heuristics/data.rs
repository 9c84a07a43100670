//! Static word lists consulted by the heuristics.

/// Curated antonym pairs used when the lexicon has nothing for a word.
pub const ANTONYM_MANUAL_PAIRS: &[(&str, &str)] = &[
    ("accept", "reject"),
    ("advantage", "disadvantage"),
    ("abundant", "scarce"),
    ("ancient", "modern"),
    ("arrive", "depart"),
    ("artificial", "natural"),
    ("asset", "liability"),
    ("attack", "defend"),
    ("benefit", "harm"),
    ("brave", "cowardly"),
    ("cheap", "expensive"),
    ("complex", "simple"),
    ("confirm", "deny"),
    ("construct", "destroy"),
    ("decline", "increase"),
    ("decrease", "increase"),
    ("deficit", "surplus"),
    ("demand", "supply"),
    ("dense", "sparse"),
    ("diligent", "lazy"),
    ("domestic", "foreign"),
    ("expand", "contract"),
    ("export", "import"),
    ("external", "internal"),
    ("failure", "success"),
    ("flexible", "rigid"),
    ("generous", "stingy"),
    ("guilty", "innocent"),
    ("hostile", "friendly"),
    ("include", "exclude"),
    ("inferior", "superior"),
    ("majority", "minority"),
    ("maximum", "minimum"),
    ("optimistic", "pessimistic"),
    ("permanent", "temporary"),
    ("positive", "negative"),
    ("profit", "loss"),
    ("public", "private"),
    ("rural", "urban"),
    ("shallow", "deep"),
    ("strengthen", "weaken"),
    ("vague", "precise"),
];

/// Prefix-stripped pairs that look like negations but are not antonyms.
pub const ANTONYM_FALSE_PREFIX_PAIRS: &[(&str, &str)] = &[
    ("invaluable", "valuable"),
    ("inflammable", "flammable"),
    ("unravel", "ravel"),
    ("disgruntled", "gruntled"),
    ("important", "portant"),
    ("impress", "press"),
    ("imply", "ply"),
    ("interest", "terest"),
    ("instance", "stance"),
    ("insight", "sight"),
    ("income", "come"),
    ("invent", "vent"),
    ("uncover", "cover"),
    ("disease", "ease"),
    ("discover", "cover"),
    ("dispatch", "patch"),
    ("display", "play"),
    ("dismiss", "miss"),
    ("illustrate", "lustrate"),
    ("irritate", "ritate"),
];

/// Commonly confused word pairs, scored directly.
pub const CONFUSED_PAIRS: &[(&str, &str)] = &[
    ("accept", "except"),
    ("adapt", "adopt"),
    ("advice", "advise"),
    ("affect", "effect"),
    ("allusion", "illusion"),
    ("complement", "compliment"),
    ("conscience", "conscious"),
    ("continual", "continuous"),
    ("council", "counsel"),
    ("desert", "dessert"),
    ("elicit", "illicit"),
    ("eminent", "imminent"),
    ("ensure", "insure"),
    ("lose", "loose"),
    ("principal", "principle"),
    ("stationary", "stationery"),
    ("economic", "economical"),
    ("historic", "historical"),
    ("sensible", "sensitive"),
    ("personal", "personnel"),
];

/// Prefixes stripped before root matching, with their meanings.
pub const COMMON_PREFIXES: &[(&str, &str)] = &[
    ("anti", "against"),
    ("auto", "self"),
    ("co", "together"),
    ("com", "with"),
    ("con", "with"),
    ("counter", "against"),
    ("de", "down, away"),
    ("dis", "not, apart"),
    ("em", "in"),
    ("en", "in"),
    ("ex", "out"),
    ("fore", "before"),
    ("im", "not, in"),
    ("in", "not, in"),
    ("inter", "between"),
    ("mis", "wrongly"),
    ("non", "not"),
    ("over", "too much"),
    ("post", "after"),
    ("pre", "before"),
    ("pro", "forward"),
    ("re", "again"),
    ("semi", "half"),
    ("sub", "under"),
    ("super", "above"),
    ("trans", "across"),
    ("un", "not"),
    ("under", "below"),
];

pub struct RootInfo {
    pub meaning: &'static str,
    pub variants: &'static [&'static str],
    /// Words accepted for this root without positional checks
    pub examples: &'static [&'static str],
}

macro_rules! root {
    ($root:expr, $meaning:expr, [$($v:expr),*], [$($e:expr),*]) => {
        ($root, RootInfo { meaning: $meaning, variants: &[$($v),*], examples: &[$($e),*] })
    };
}

pub const LATIN_GREEK_ROOTS: &[(&str, RootInfo)] = &[
    root!("audi", "hear", ["aud"], ["audience", "audible", "audio", "audition", "auditorium"]),
    root!("bene", "good", ["bon"], ["benefit", "benevolent", "beneficial", "bonus"]),
    root!("bio", "life", [], ["biology", "biography", "antibiotic", "biodiversity"]),
    root!("cede", "go, yield", ["ceed", "cess"], ["precede", "proceed", "succeed", "recession", "access", "exceed"]),
    root!("chron", "time", [], ["chronic", "chronology", "synchronize", "chronicle"]),
    root!("cred", "believe", [], ["credible", "credit", "incredible", "credential", "credulous"]),
    root!("dict", "say", ["dic"], ["predict", "dictate", "contradict", "dictionary", "verdict", "indicate"]),
    root!("duct", "lead", ["duc"], ["conduct", "produce", "reduce", "introduce", "deduct", "educate"]),
    root!("fact", "make, do", ["fect", "fic"], ["factory", "manufacture", "effect", "affect", "efficient", "sufficient"]),
    root!("fer", "carry", [], ["transfer", "refer", "infer", "differ", "fertile"]),
    root!("form", "shape", [], ["reform", "transform", "uniform", "formation", "formula"]),
    root!("geo", "earth", [], ["geography", "geology", "geometry", "geothermal"]),
    root!("graph", "write", ["gram"], ["autograph", "paragraph", "graphic", "photograph", "photographer", "grammar", "telegram"]),
    root!("ject", "throw", [], ["project", "reject", "inject", "object", "subject", "eject"]),
    root!("junct", "join", ["join"], ["junction", "conjunction", "adjunct", "joint"]),
    root!("log", "word, study", ["logy"], ["biology", "dialogue", "logic", "apology", "ecology", "technology"]),
    root!("manu", "hand", ["man"], ["manual", "manufacture", "manuscript", "manipulate"]),
    root!("mit", "send", ["miss"], ["transmit", "submit", "emit", "permit", "mission", "dismiss", "emission"]),
    root!("mort", "death", [], ["mortal", "immortal", "mortality", "mortgage"]),
    root!("morph", "form", [], ["metamorphosis", "amorphous", "morphology"]),
    root!("nov", "new", [], ["novel", "innovate", "innovation", "renovate", "novice"]),
    root!("path", "feeling", [], ["sympathy", "empathy", "apathy", "pathetic", "telepathy"]),
    root!("ped", "foot", ["pod"], ["pedal", "pedestrian", "tripod", "expedition"]),
    root!("pend", "hang, weigh", ["pens"], ["depend", "pendant", "suspend", "expensive", "pension", "compensate"]),
    root!("phon", "sound", [], ["telephone", "symphony", "phonetic", "microphone"]),
    root!("photo", "light", ["phos"], ["photograph", "photographer", "photosynthesis", "phosphorus"]),
    root!("port", "carry", [], ["transport", "import", "export", "portable", "support", "report"]),
    root!("press", "press", [], ["pressure", "express", "impress", "depress", "compress", "oppress"]),
    root!("rupt", "break", [], ["erupt", "interrupt", "bankrupt", "corrupt", "disrupt", "rupture"]),
    root!("scrib", "write", ["script"], ["describe", "prescribe", "subscribe", "manuscript", "transcript", "scribble"]),
    root!("sect", "cut", ["sec"], ["section", "dissect", "intersect", "insect", "sector"]),
    root!("sent", "feel", ["sens"], ["sentiment", "consent", "resent", "sensitive", "sensible", "sensation"]),
    root!("spect", "look", ["spic"], ["inspect", "respect", "spectator", "perspective", "suspicious", "conspicuous"]),
    root!("struct", "build", ["stru"], ["construct", "destruct", "structure", "instruct", "obstruct", "infrastructure"]),
    root!("tele", "far", [], ["telephone", "telescope", "television", "telegram", "telepathy"]),
    root!("tend", "stretch", ["tens", "tent"], ["extend", "intend", "tension", "intense", "attention", "pretend"]),
    root!("therm", "heat", [], ["thermal", "thermometer", "thermostat", "geothermal"]),
    root!("tract", "pull, drag", [], ["attract", "tractor", "extract", "subtract", "contract", "distract"]),
    root!("vert", "turn", ["vers"], ["convert", "divert", "reverse", "version", "diverse", "advertise"]),
    root!("vid", "see", ["vis"], ["video", "evident", "provide", "vision", "visible", "revise", "supervise"]),
    root!("voc", "call", ["vok"], ["vocal", "advocate", "vocation", "provoke", "revoke", "evoke"]),
];

/// Words that contain a root's letters without carrying its meaning.
pub const ROOT_DENYLIST: &[(&str, &[&str])] = &[
    ("port", &["portion", "portrait", "porter", "important", "opportunity"]),
    ("press", &["cypress"]),
    ("sent", &["present", "absent", "represent", "sentence"]),
    ("form", &["inform", "information", "former", "formal"]),
    ("tend", &["tender", "attend", "attendance"]),
    ("vers", &["anniversary", "university"]),
    ("sect", &["insect"]),
    ("path", &["pathway", "footpath"]),
    ("mort", &["mortgage"]),
    ("manu", &["manure"]),
    ("vert", &["advertise", "advertisement"]),
];

/// Topic buckets and their member words.
pub const TOPICS: &[(&str, &[&str])] = &[
    (
        "environment",
        &[
            "pollution", "emission", "climate", "biodiversity", "conservation", "deforestation",
            "ecosystem", "habitat", "renewable", "sustainable", "contamination", "drought",
            "erosion", "extinction", "recycle", "landfill", "carbon", "greenhouse",
        ],
    ),
    (
        "education",
        &[
            "curriculum", "literacy", "tuition", "scholarship", "academic", "lecture",
            "seminar", "assessment", "diploma", "enrolment", "pedagogy", "syllabus",
            "graduate", "undergraduate", "vocational", "discipline", "compulsory",
        ],
    ),
    (
        "technology",
        &[
            "innovation", "automation", "artificial", "digital", "software", "hardware",
            "algorithm", "database", "device", "gadget", "internet", "network", "robot",
            "virtual", "cyber", "obsolete", "breakthrough",
        ],
    ),
    (
        "health",
        &[
            "obesity", "nutrition", "diet", "epidemic", "pandemic", "vaccine", "immune",
            "chronic", "symptom", "therapy", "diagnosis", "prescription", "surgery",
            "wellbeing", "fitness", "sedentary", "infection",
        ],
    ),
    (
        "crime",
        &[
            "offender", "punishment", "prison", "rehabilitation", "deterrent", "penalty",
            "juvenile", "violence", "burglary", "fraud", "theft", "victim", "justice",
            "sentence", "probation", "legislation",
        ],
    ),
    (
        "economy",
        &[
            "inflation", "recession", "unemployment", "investment", "taxation", "budget",
            "revenue", "deficit", "surplus", "export", "import", "tariff", "consumer",
            "commodity", "subsidy", "poverty", "wealth", "profit",
        ],
    ),
    (
        "media",
        &[
            "advertising", "broadcast", "journalism", "censorship", "propaganda", "publicity",
            "headline", "coverage", "audience", "documentary", "tabloid", "newspaper",
            "commercial", "influence", "celebrity",
        ],
    ),
    (
        "travel",
        &[
            "tourism", "destination", "itinerary", "accommodation", "landmark", "heritage",
            "souvenir", "passport", "customs", "excursion", "voyage", "journey", "expedition",
            "sightseeing", "hospitality",
        ],
    ),
    (
        "urbanisation",
        &[
            "urban", "rural", "infrastructure", "congestion", "commute", "suburb",
            "skyscraper", "housing", "overcrowding", "migration", "pedestrian", "transport",
            "population", "density",
        ],
    ),
];

// src/sectors.rs
// Static sector -> major companies table. Unknown sectors yield an empty
// list, not an error; the pipeline still runs end-to-end for them.

/// Major Indian companies for the predefined sectors.
pub fn companies_for(sector: &str) -> Vec<String> {
    let names: &[&str] = match sector.to_ascii_lowercase().as_str() {
        "pharmaceuticals" => &[
            "Sun Pharma",
            "Dr. Reddy's",
            "Cipla",
            "Lupin",
            "Aurobindo Pharma",
            "Divi's Labs",
        ],
        "technology" => &[
            "TCS",
            "Infosys",
            "Wipro",
            "HCL Technologies",
            "Tech Mahindra",
            "Mindtree",
        ],
        "banking" => &[
            "HDFC Bank",
            "ICICI Bank",
            "State Bank of India",
            "Kotak Mahindra",
            "Axis Bank",
        ],
        "automotive" => &[
            "Tata Motors",
            "Mahindra",
            "Maruti Suzuki",
            "Bajaj Auto",
            "Hero MotoCorp",
        ],
        "agriculture" => &[
            "UPL",
            "Godrej Agrovet",
            "Kaveri Seed",
            "Rallis India",
            "Coromandel International",
        ],
        "energy" => &[
            "Reliance Industries",
            "ONGC",
            "Coal India",
            "NTPC",
            "Power Grid Corporation",
        ],
        "steel" => &["Tata Steel", "JSW Steel", "SAIL", "Jindal Steel", "JSPL"],
        "cement" => &[
            "UltraTech Cement",
            "Ambuja Cements",
            "ACC Limited",
            "Shree Cement",
            "JK Cement",
        ],
        "fmcg" => &[
            "Hindustan Unilever",
            "ITC",
            "Nestle India",
            "Britannia",
            "Godrej Consumer",
        ],
        "telecom" => &["Bharti Airtel", "Reliance Jio", "Vodafone Idea", "BSNL"],
        _ => &[],
    };
    names.iter().map(|s| s.to_string()).collect()
}

/// "technology" -> "Technology", "real estate" -> "Real Estate".
pub fn title_case(sector: &str) -> String {
    sector
        .split_whitespace()
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().collect::<String>() + cs.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

//! # Textos de Demonstração e Gazetteer Padrão
//!
//! Dados embutidos para que o servidor funcione sem nenhum arquivo externo:
//! alguns textos multi-linha para a interface e um gazetteer pequeno com as
//! três classes observadas por padrão (PERSON, LOCATION, ORGANIZATION).

const PERSONS: &[&str] = &[
    "George Clooney", "Mila Kunis", "Ashton Kutcher", "Barack Obama",
    "Ada Lovelace", "Alan Turing", "Grace Hopper", "Marie Curie",
    "Albert Einstein", "Machado de Assis", "Pelé", "Ayrton Senna",
    "Santos Dumont",
];

const LOCATIONS: &[&str] = &[
    "Los Angeles", "New York", "San Francisco", "London", "Paris",
    "Berlin", "Tokyo", "California", "Texas", "Brazil", "São Paulo",
    "Rio de Janeiro", "England", "France", "Germany", "Japan",
    "United States", "Europe", "Africa", "Amazon",
];

const ORGANIZATIONS: &[&str] = &[
    "Stanford University", "Google", "Microsoft", "Apple", "IBM",
    "United Nations", "NASA", "Petrobras", "Embraer", "Warner Bros",
    "The New York Times", "Reuters", "FIFA", "World Health Organization",
];

/// Entradas do gazetteer padrão, agrupadas por label.
pub fn default_gazetteer() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("PERSON", PERSONS),
        ("LOCATION", LOCATIONS),
        ("ORGANIZATION", ORGANIZATIONS),
    ]
}

/// Textos de demonstração: (domínio, texto). Cada linha é tratada como uma sentença.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Cinema",
            "George Clooney and Mila Kunis live in Los Angeles.\n\
             Ashton Kutcher visited New York with Warner Bros executives.\n",
        ),
        (
            "Ciência",
            "Ada Lovelace worked with Charles Babbage in London.\n\
             Dr. Grace Hopper joined the Navy before moving to IBM.\n\
             Alan Turing studied at Princeton, far from England.",
        ),
        (
            "Brasil",
            "Santos Dumont flew in Paris.\r\n\
             Petrobras and Embraer are based in Brazil.\r\n\
             \r\n\
             Ayrton Senna was born in São Paulo.",
        ),
        (
            "Política",
            "President Barack Obama spoke at the United Nations.\n\
             The World Health Organization met in Berlin, Tokyo and Paris.",
        ),
    ]
}

use crate::extract::cascade::StrategySpec;
use crate::sites::SiteConfig;

fn css(selectors: &[&str]) -> Vec<StrategySpec> {
    selectors.iter().map(|s| StrategySpec::css(s)).collect()
}

fn href(selectors: &[&str]) -> Vec<StrategySpec> {
    selectors
        .iter()
        .map(|s| StrategySpec::attr(s, "href"))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn welcome_to_the_jungle() -> SiteConfig {
    let mut company = css(&[
        "span[class*='company']",
        "span[data-testid*='company']",
        "p[class*='company']",
        "div[class*='company']",
    ]);
    company.push(StrategySpec::short_text("span", 6));

    SiteConfig {
        id: "wttj".to_string(),
        name: "Welcome to the Jungle".to_string(),
        listing_url: "https://www.welcometothejungle.com/fr/jobs?page={page}&aroundLatLng=48.85717%2C2.3414&aroundRadius=20&aroundQuery=Paris%2C%20France&sortBy=mostRecent&refinementList%5Bprofession.sub_category_reference%5D%5B%5D=software-web-development-iMzA4".to_string(),
        base_url: "https://www.welcometothejungle.com".to_string(),
        first_page: 1,
        page_step: 1,
        max_pages: 3,
        cards: strings(&[
            "li[data-testid='search-results-list-item-wrapper']",
            "article",
            "div[class*='job']",
        ]),
        title: css(&["h2", "h3", "h1", "a[data-testid*='title']", "span[class*='title']"]),
        company,
        location: css(&["[data-testid*='location']", "span[class*='location']"]),
        link: href(&["a[href*='/jobs/']", "a[href*='/companies/']"]),
        thumbnail: vec![StrategySpec::attr("img", "src")],
        link_filter: None,
    }
}

pub fn jobteaser() -> SiteConfig {
    let mut company = css(&[
        "p[data-testid='jobad-card-company-name']",
        "span[class*='company']",
        "div[class*='company']",
        "span[class*='name']",
    ]);
    company.push(StrategySpec::short_text("span, p, div", 4));

    SiteConfig {
        id: "jobteaser".to_string(),
        name: "JobTeaser".to_string(),
        listing_url: "https://www.jobteaser.com/fr/job-offers?p={page}&contract=cdd,cdi&position_category_uuid=ddc0460c-ce0b-4d98-bc5d-d8829ff9cf11&location=France%3A%3A%C3%8Ele-de-France..%C3%8Ele-de-France%20(France)&locale=en,fr".to_string(),
        base_url: "https://www.jobteaser.com".to_string(),
        first_page: 0,
        page_step: 1,
        max_pages: 3,
        cards: strings(&[
            "ul[data-testid='job-ads-wrapper'] div[data-testid='jobad-card']",
            "ul[data-testid='search-results-list'] div[data-testid='jobad-card']",
            "div[data-testid='jobad-card']",
        ]),
        title: css(&[
            "a[class*='JobAdCard_link']",
            "a[data-testid='jobad-card-title']",
            "h3",
        ]),
        company,
        location: css(&["[data-testid='jobad-card-location']", "span[class*='location']"]),
        link: href(&[
            "a[class*='JobAdCard_link']",
            "a[data-testid='jobad-card-title']",
            "a[href]",
        ]),
        thumbnail: vec![
            StrategySpec::attr("img[data-testid='jobad-card-company-logo']", "src"),
            StrategySpec::attr("img[class*='logo']", "src"),
            StrategySpec::attr("img", "src"),
        ],
        link_filter: None,
    }
}

pub fn station_f() -> SiteConfig {
    let mut company = css(&[
        "li.job-company",
        "span[class*='company']",
        "div[class*='company']",
        "p[class*='company']",
    ]);
    company.push(StrategySpec::short_text("span, li, div", 4));

    SiteConfig {
        id: "stationf".to_string(),
        name: "Station F".to_string(),
        listing_url: "https://jobs.stationf.co/search?query=dev&page={page}&departments%5B0%5D=Tech&departments%5B1%5D=Tech%20%26%20Dev&departments%5B2%5D=Tech%2FDev&departments%5B3%5D=Dev&contract_types%5B0%5D=Full-Time&contract_types%5B1%5D=Freelance&contract_types%5B2%5D=Temporary".to_string(),
        base_url: "https://jobs.stationf.co".to_string(),
        first_page: 1,
        page_step: 1,
        max_pages: 1,
        cards: strings(&["li.ais-Hits-item"]),
        title: css(&["h4.job-title"]),
        company,
        location: css(&["li.job-office"]),
        link: href(&["a.jobs-item-link"]),
        thumbnail: vec![StrategySpec::attr_pattern(
            "div.company-logo",
            "style",
            r#"(https?://[^\s'")]+)"#,
        )],
        link_filter: None,
    }
}

pub fn indeed() -> SiteConfig {
    let mut title = css(&["[data-testid='job-title']"]);
    title.push(StrategySpec::attr("[aria-label]", "aria-label"));
    title.push(StrategySpec::css("h2"));

    let mut company = css(&["[data-testid='company-name']"]);
    company.push(StrategySpec::attr("[data-testid='company-name'] [aria-label]", "aria-label"));
    company.push(StrategySpec::short_text("span, div", 4));

    let mut location = css(&["[data-testid='job-location']", "[data-testid='text-location']"]);
    location.push(StrategySpec::pattern(
        r"(?i)((?:Paris|Lyon|Marseille|Bordeaux|Nantes|Lille|Toulouse|Nice|Strasbourg)\s*\(?\d{2,5}\)?)",
    ));

    SiteConfig {
        id: "indeed".to_string(),
        name: "Indeed".to_string(),
        listing_url: "https://fr.indeed.com/jobs?q=developpeur+software&l=Paris&sort=date&start={page}".to_string(),
        base_url: "https://fr.indeed.com".to_string(),
        first_page: 0,
        page_step: 10,
        max_pages: 2,
        cards: strings(&[
            "div.job_seen_beacon",
            "div[class*='slider_container']",
            "div[class*='tapItem']",
            "a[class*='tapItem']",
            "li[class*='css-5lfssm']",
        ]),
        title,
        company,
        location,
        link: href(&[
            "a[href*='/rc/clk']",
            "a[href*='/pagead/']",
            "a[href*='/viewjob']",
            "a[href*='/jobs/view']",
        ]),
        thumbnail: vec![
            StrategySpec::attr("img[src]", "src"),
            StrategySpec::attr("img[data-src]", "data-src"),
        ],
        link_filter: None,
    }
}

pub fn apec() -> SiteConfig {
    let mut company = css(&[
        "span[class*='company']",
        "div[class*='company']",
        "span[class*='card-offer__company']",
        "div[class*='offer-card__company']",
    ]);
    company.push(StrategySpec::attr("[data-company]", "data-company"));
    company.push(StrategySpec::short_text("span, div", 4));

    SiteConfig {
        id: "apec".to_string(),
        name: "APEC".to_string(),
        listing_url: "https://www.apec.fr/candidat/recherche-emploi.html/emploi?lieux=91&motsCles=developpeur&page={page}".to_string(),
        base_url: "https://www.apec.fr".to_string(),
        first_page: 0,
        page_step: 1,
        max_pages: 3,
        cards: strings(&[
            "div[class*='offer-card']",
            "div[class*='card-offer']",
            "li[class*='offer']",
            "article",
        ]),
        title: css(&[
            "h2[class*='title']",
            "h3[class*='title']",
            "span[class*='card-offer__title']",
            "a[class*='offer-title']",
            "h2",
        ]),
        company,
        location: css(&[
            "span[class*='location']",
            "div[class*='location']",
            "span[class*='card-offer__location']",
        ]),
        link: href(&[
            "a[href*='/offre-emploi/']",
            "a[class*='offer-link']",
            "a[data-link]",
        ]),
        thumbnail: vec![],
        link_filter: Some("/offre-emploi/".to_string()),
    }
}

pub fn cadremploi() -> SiteConfig {
    let mut company = css(&[
        "span.company-name",
        "span.entreprise",
        "div.company",
        "span[class*='company']",
        "div[class*='entreprise']",
        "a[href*='/entreprise/']",
    ]);
    company.push(StrategySpec::short_text("span, div, a", 4));

    let mut location = css(&[
        "span.location",
        "span.city",
        "div.location",
        "span[class*='location']",
    ]);
    location.push(StrategySpec::pattern(
        r"(?i)((?:Paris|Lyon|Bordeaux|Marseille|Nantes|Toulouse)\s*\(?\d{2,5}\)?)",
    ));

    SiteConfig {
        id: "cadremploi".to_string(),
        name: "Cadremploi".to_string(),
        listing_url: "https://www.cadremploi.fr/emploi/developpeur_logiciel_paris_{page}".to_string(),
        base_url: "https://www.cadremploi.fr".to_string(),
        first_page: 1,
        page_step: 1,
        max_pages: 3,
        cards: strings(&[
            "article.job-card",
            "div.job-card",
            "article.offer-card",
            "div.offer-card",
            "article[data-offer-id]",
            "div[class*='job']",
            "div[class*='offer']",
        ]),
        title: css(&[
            "h2.job-title",
            "h3.job-title",
            "h2.title a",
            "h3.title a",
            "a.job-title",
            "h2 a",
            "h3 a",
        ]),
        company,
        location,
        link: href(&[
            "a[href*='/offre/']",
            "a[href*='/emploi/']",
            "a[href*='/job/']",
            "a[href]",
        ]),
        thumbnail: vec![StrategySpec::attr("img[src]", "src")],
        link_filter: None,
    }
}

pub fn keljob() -> SiteConfig {
    let mut company = css(&[
        "span[class*='company']",
        "div[class*='company']",
        "span[class*='entreprise']",
    ]);
    company.push(StrategySpec::short_text("span, div", 4));

    SiteConfig {
        id: "keljob".to_string(),
        name: "Keljob".to_string(),
        listing_url: "https://www.keljob.com/emploi/recherche.html?motscles=developpeur&lieux=75P&page={page}".to_string(),
        base_url: "https://www.keljob.com".to_string(),
        first_page: 1,
        page_step: 1,
        max_pages: 3,
        cards: strings(&[
            "div[class*='job']",
            "article",
            "div[class*='offer']",
            "li[class*='result']",
        ]),
        title: css(&[
            "h2[class*='title']",
            "h3[class*='title']",
            "a[class*='job']",
            "a[href]",
        ]),
        company,
        location: vec![StrategySpec::pattern(
            r"(?i)((?:Paris|Lyon|Bordeaux|Marseille)\s*\(?\d{2,5}\)?)",
        )],
        link: href(&["a[href]"]),
        thumbnail: vec![StrategySpec::attr("img[src]", "src")],
        link_filter: None,
    }
}

pub fn lesjeudis() -> SiteConfig {
    let mut company = css(&[
        "span.company-name",
        "span.job-company",
        "div.company",
        "span[class*='company']",
        "div[class*='company']",
    ]);
    company.push(StrategySpec::short_text("span", 4));

    SiteConfig {
        id: "lesjeudis".to_string(),
        name: "LesJeudis".to_string(),
        listing_url: "https://www.lesjeudis.com/recherche?f=1&q=developpeur&l=Paris&p={page}".to_string(),
        base_url: "https://www.lesjeudis.com".to_string(),
        first_page: 1,
        page_step: 1,
        max_pages: 3,
        cards: strings(&[
            "article.job-card",
            "div.job-card",
            "article[data-testid]",
            "div[data-testid*='job']",
            "li.job-item",
            "article",
            "div[class*='job']",
        ]),
        title: css(&[
            "h2.job-title a",
            "h3.job-title a",
            "a.job-title",
            "h2 a[data-testid]",
            "h3 a[data-testid]",
            "h2.title",
            "h3.title",
        ]),
        company,
        location: css(&[
            "span.location",
            "span.job-location",
            "div.location",
            "span[class*='location']",
        ]),
        link: href(&[
            "a[href*='/job/']",
            "a[href*='/offre/']",
            "a[href*='/emploi/']",
            "a[href]",
        ]),
        thumbnail: vec![StrategySpec::attr("img[src]", "src")],
        link_filter: None,
    }
}

pub fn linkedin() -> SiteConfig {
    let mut company = css(&[
        "span[class*='company']",
        "a[class*='company']",
        "h4[class*='company']",
        "span.base-search-card__subtitle",
        "h4.base-search-card__subtitle",
    ]);
    company.push(StrategySpec::short_text("span, a, h4", 4));

    SiteConfig {
        id: "linkedin".to_string(),
        name: "LinkedIn".to_string(),
        listing_url: "https://www.linkedin.com/jobs/search?keywords=D%C3%A9veloppeur%20Software&location=Paris%2C%20France&geoId=105015875&f_TPR=r86400&start={page}".to_string(),
        base_url: "https://www.linkedin.com".to_string(),
        first_page: 0,
        page_step: 25,
        max_pages: 1,
        cards: strings(&[
            "div[class*='job-card-container']",
            "li[class*='jobs-search-results__list-item']",
            "div[class*='base-card']",
            "div[data-job-id]",
            "div[class*='job-search-card']",
        ]),
        title: css(&[
            "h3[class*='title']",
            "span[class*='job-card-container__link']",
            "h3.base-search-card__title",
            "h3",
        ]),
        company,
        location: css(&[
            "span[class*='location']",
            "span.job-card-container__metadata-item",
            "span.base-search-card__metadata",
        ]),
        link: href(&["a[href*='/jobs/view/']"]),
        thumbnail: vec![
            StrategySpec::attr("img[class*='entity-image']", "src"),
            StrategySpec::attr("img[data-delayed-url]", "data-delayed-url"),
            StrategySpec::attr("img[src]", "src"),
        ],
        link_filter: Some("/jobs/view/".to_string()),
    }
}

/// The boards monitored when no site file is given.
pub fn sites() -> Vec<SiteConfig> {
    vec![
        welcome_to_the_jungle(),
        jobteaser(),
        station_f(),
        indeed(),
        apec(),
        cadremploi(),
        keljob(),
        lesjeudis(),
        linkedin(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::{SiteAdapter, compile_all};

    #[test]
    fn builtin_sites_compile() {
        let adapters = compile_all(&sites()).unwrap();
        let ids: Vec<&str> = adapters.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "wttj",
                "jobteaser",
                "stationf",
                "indeed",
                "apec",
                "cadremploi",
                "keljob",
                "lesjeudis",
                "linkedin",
            ]
        );
    }

    #[test]
    fn linkedin_keeps_only_job_view_links() {
        let adapter = SiteAdapter::compile(&linkedin()).unwrap();
        assert_eq!(adapter.max_pages(), 1);
        assert!(adapter.listing_url(0).ends_with("&start=0"));

        let markup = r#"<ul>
            <li><div class="base-card job-search-card">
                <a class="base-card__full-link" href="https://fr.linkedin.com/jobs/view/backend-rust-4012?trk=public_jobs">Voir</a>
                <h3 class="base-search-card__title">Développeur Backend Rust</h3>
                <h4 class="base-search-card__subtitle">Qonto</h4>
                <span class="job-search-card__location">Paris, Île-de-France</span>
            </div></li>
            <li><div class="base-card job-search-card">
                <a href="https://fr.linkedin.com/company/qonto">Qonto</a>
                <h3 class="base-search-card__title">Page entreprise</h3>
            </div></li>
        </ul>"#;

        let cards = adapter.extract_cards(markup);
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert!(card.url.contains("/jobs/view/backend-rust-4012"));
        assert_eq!(card.title.as_deref(), Some("Développeur Backend Rust"));
        assert_eq!(card.company.as_deref(), Some("Qonto"));
        assert_eq!(card.location.as_deref(), Some("Paris, Île-de-France"));
    }

    #[test]
    fn apec_pages_from_zero() {
        let adapter = SiteAdapter::compile(&apec()).unwrap();
        assert!(adapter.listing_url(0).ends_with("&page=0"));
        assert!(adapter.listing_url(2).ends_with("&page=2"));
    }

    #[test]
    fn indeed_paginates_by_offset() {
        let adapter = SiteAdapter::compile(&indeed()).unwrap();
        assert!(adapter.listing_url(1).ends_with("&start=10"));
    }

    #[test]
    fn station_f_card() {
        let adapter = SiteAdapter::compile(&station_f()).unwrap();
        let markup = r#"<ul><li class="ais-Hits-item">
            <div class="company-logo" style="background-image: url('https://cdn.stationf.co/logo.png');"></div>
            <a class="jobs-item-link" href="/companies/mistral/jobs/backend-engineer">
                <h4 class="job-title">Backend Engineer</h4>
            </a>
            <ul>
                <li class="job-company">Mistral AI</li>
                <li class="job-office">Paris</li>
                <li class="job-contract">CDI</li>
            </ul>
        </li></ul>"#;

        let cards = adapter.extract_cards(markup);
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(
            card.url,
            "https://jobs.stationf.co/companies/mistral/jobs/backend-engineer"
        );
        assert_eq!(card.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(card.company.as_deref(), Some("Mistral AI"));
        assert_eq!(card.location.as_deref(), Some("Paris"));
        assert_eq!(card.thumbnail.as_deref(), Some("https://cdn.stationf.co/logo.png"));
    }
}

use std::collections::BTreeSet;

use crate::extract::fold_text;

/// Closed technology taxonomy: canonical tag and its surface forms.
///
/// Surface forms are matched on alphanumeric boundaries, so "java" does not
/// fire inside "javascript" and "css" does not fire inside "scss". A form may
/// belong to several tags ("react native" is both react and react-native).
pub const TAXONOMY: &[(&str, &[&str])] = &[
    // frontend
    ("javascript", &["javascript", "js", "es6", "ecmascript", "vanilla js"]),
    ("typescript", &["typescript"]),
    ("react", &["react", "reactjs", "react.js", "react native", "next.js", "nextjs", "gatsby"]),
    ("angular", &["angular", "angularjs", "angular.js"]),
    ("vue", &["vue", "vuejs", "vue.js", "nuxt", "nuxt.js", "nuxtjs"]),
    ("svelte", &["svelte", "sveltekit"]),
    ("solidjs", &["solidjs", "solid.js"]),
    ("jquery", &["jquery"]),
    ("html", &["html", "html5"]),
    ("css", &["css", "css3"]),
    ("sass", &["sass", "scss"]),
    ("tailwind", &["tailwind", "tailwindcss"]),
    ("bootstrap", &["bootstrap"]),
    ("material-ui", &["material-ui", "material ui", "mui"]),
    ("styled-components", &["styled-components", "styled components"]),
    // backend
    ("node", &["node", "nodejs", "node.js", "express.js", "expressjs", "fastify", "nest.js", "nestjs"]),
    ("python", &["python", "django", "flask", "fastapi", "tornado", "pyramid"]),
    ("php", &["php", "laravel", "symfony", "codeigniter"]),
    ("java", &["java", "spring", "springboot", "spring boot", "jakarta ee", "jee"]),
    ("kotlin", &["kotlin"]),
    ("scala", &["scala", "akka", "play framework"]),
    ("go", &["golang", "go lang"]),
    ("rust", &["rust", "actix", "tokio", "axum"]),
    ("ruby", &["ruby", "rails", "ruby on rails", "sinatra"]),
    ("elixir", &["elixir", "phoenix"]),
    ("c++", &["c++", "cpp"]),
    ("c#", &["c#", "csharp", ".net", "dotnet", "asp.net", "aspnetcore"]),
    // mobile
    ("swift", &["swift", "ios", "swiftui"]),
    ("kotlin-android", &["kotlin", "android", "jetpack compose"]),
    ("flutter", &["flutter", "dart"]),
    ("react-native", &["react native", "react-native"]),
    // databases
    ("postgresql", &["postgresql", "postgres", "psql"]),
    ("mysql", &["mysql", "mariadb"]),
    ("mongodb", &["mongodb", "mongo", "mongoose"]),
    ("redis", &["redis"]),
    ("elasticsearch", &["elasticsearch", "elastic search", "opensearch"]),
    ("cassandra", &["cassandra"]),
    ("dynamodb", &["dynamodb", "dynamo db"]),
    ("firebase", &["firebase", "firestore"]),
    ("sqlite", &["sqlite"]),
    ("sql", &["sql", "pl/sql", "t-sql", "tsql"]),
    ("kafka", &["kafka"]),
    ("rabbitmq", &["rabbitmq"]),
    // devops and cloud
    ("docker", &["docker", "dockerfile", "docker-compose", "containerization"]),
    ("kubernetes", &["kubernetes", "k8s", "helm", "openshift"]),
    ("aws", &["aws", "amazon web services", "ec2", "s3", "aws lambda", "cloudfront"]),
    ("azure", &["azure", "microsoft azure", "azure devops"]),
    ("gcp", &["gcp", "google cloud", "google cloud platform", "bigquery"]),
    ("terraform", &["terraform", "infrastructure as code", "iac"]),
    ("ansible", &["ansible"]),
    ("jenkins", &["jenkins"]),
    ("ci-cd", &["ci/cd", "cicd", "ci-cd"]),
    ("github-actions", &["github actions", "gitlab ci", "gitlab-ci"]),
    ("circleci", &["circleci", "circle ci"]),
    ("linux", &["linux", "unix", "bash"]),
    // tooling
    ("git", &["git", "github", "gitlab", "bitbucket"]),
    ("jira", &["jira"]),
    ("figma", &["figma"]),
    // apis and protocols
    ("graphql", &["graphql", "apollo"]),
    ("rest", &["restful", "rest api", "api rest", "apis rest", "rest apis"]),
    ("grpc", &["grpc", "grpc-web", "protobuf"]),
    ("websocket", &["websocket", "websockets", "socket.io"]),
    ("oauth", &["oauth", "oauth2", "openid", "jwt"]),
    // testing
    ("jest", &["jest"]),
    ("cypress", &["cypress"]),
    ("selenium", &["selenium"]),
    ("playwright", &["playwright"]),
    ("pytest", &["pytest"]),
    ("junit", &["junit"]),
    ("cucumber", &["cucumber", "gherkin"]),
    // state management
    ("redux", &["redux"]),
    ("mobx", &["mobx"]),
    // build tools
    ("webpack", &["webpack"]),
    ("vite", &["vite", "vitejs"]),
    ("babel", &["babel"]),
    // data and ml
    ("pandas", &["pandas"]),
    ("numpy", &["numpy"]),
    ("scikit-learn", &["scikit-learn", "sklearn"]),
    ("tensorflow", &["tensorflow"]),
    ("pytorch", &["pytorch"]),
    ("spark", &["spark", "pyspark"]),
    // cms and commerce
    ("wordpress", &["wordpress"]),
    ("drupal", &["drupal"]),
    ("shopify", &["shopify"]),
    ("prestashop", &["prestashop"]),
    ("magento", &["magento"]),
    // methods
    ("agile", &["agile", "scrum", "kanban"]),
    ("tdd", &["tdd", "test driven", "test-driven"]),
    ("ddd", &["ddd", "domain driven", "domain-driven"]),
];

/// Canonical tags whose surface forms occur in `text`, sorted.
pub fn extract_technologies(text: &str) -> Vec<String> {
    let text = fold_text(text);
    let found: BTreeSet<&str> = TAXONOMY
        .iter()
        .filter(|(_, forms)| forms.iter().any(|form| contains_term(&text, form)))
        .map(|(tag, _)| *tag)
        .collect();
    found.into_iter().map(String::from).collect()
}

/// Whether `tag` belongs to the closed taxonomy.
pub fn is_known_tag(tag: &str) -> bool {
    TAXONOMY.iter().any(|(t, _)| *t == tag)
}

/// `term` occurs in `text` with no letter or digit directly on either side.
/// A term is also not matched right after a dot, so the "js" of "vue.js" is
/// not a standalone token.
fn contains_term(text: &str, term: &str) -> bool {
    text.match_indices(term).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + term.len()..].chars().next();
        let glued = |c: char| c.is_alphanumeric() || (c == '.' && !term.starts_with('.'));
        !before.is_some_and(glued) && !after.is_some_and(char::is_alphanumeric)
    })
}

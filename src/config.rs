use std::env;
use std::fmt;
use std::fs;

const DEFAULT_API_VERSION: &str = "2024-02-01";
const DEFAULT_GREETING: &str = "Hi! Can I help you find the right bike?";
const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an assistant that helps customer to find the right bike. Options are:

* Light, single-speed bike for urban commuting.
* Gravel bike designed to ride on many different surfaces.
* Cargo bike for transporting kids or goods.
* Racing bike for sports.
* Mountainbike designed for off-road cycling.
* All bike types above are also available with electric motors.

Ask the user about how she or he is going to use the bike. Make a suggestion
based on the intended use.

If transporting goods or kids seems to be important for the customer,
mention the option of using a bike trailer as an alternative for cargo bikes.
Point out that bike trailers should not be used with carbon bike frames.

Only answer questions related to bike type selection. If the user asks
questions not related to this topic, tell her or him that you cannot
answer such questions.";

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
    pub system_prompt: String,
    pub greeting: String,
}

// Hand-written so the key never ends up in logs or panic output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("system_prompt_len", &self.system_prompt.len())
            .field("greeting", &self.greeting)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok(), |path| fs::read_to_string(path).ok())
    }

    fn from_env_with(
        mut get_var: impl FnMut(&str) -> Option<String>,
        mut read_file: impl FnMut(&str) -> Option<String>,
    ) -> Self {
        let mut get = |key: &str| non_empty(get_var(key));

        let prompt_from_file = get("SYSTEM_PROMPT_FILE")
            .and_then(|path| non_empty(read_file(&path)))
            .map(|prompt| prompt.trim().to_string());
        let system_prompt = prompt_from_file
            .or_else(|| get("SYSTEM_PROMPT"))
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Self {
            api_key: get("OPENAI_AZURE_KEY"),
            endpoint: get("OPENAI_AZURE_ENDPOINT"),
            deployment: get("OPENAI_AZURE_DEPLOYMENT"),
            api_version: get("OPENAI_AZURE_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            system_prompt,
            greeting: get("ASSISTANT_GREETING").unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

// Prompt contract for intent resolution. Changing the wording here changes
// what the provider returns, so keep the schema lines in sync with `Product`.

/// Image URL the model is told to use when it cannot determine a real one.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x300.png?text=Product+Image";

pub const INTENT_SYSTEM_PROMPT: &str = "\
You are an intelligent shopping assistant. Analyze the user's text and determine their shopping intent.

Your response MUST be a single valid JSON object of the form:
{ \"products\": [ Product, ... ] }

Each Product object has exactly these fields:
- \"id\": string. A unique identifier: the product ID from the URL when present, otherwise a random string.
- \"title\": string. The product name.
- \"price\": number. The price as a plain number, without currency symbols.
- \"url\": string. The original URL if one was provided, otherwise a placeholder URL.
- \"image\": string. A valid image URL. For real products, find one. Otherwise use \"https://via.placeholder.com/300x300.png?text=Product+Image\".

Rules:
- If the input is a URL, extract the visible product details.
- If the input is a product name or description, imagine one realistic product that matches it.
- If you cannot identify a clear shopping intent, you MUST return { \"products\": [] }.
- Do not include explanations, apologies, markdown or any text outside the JSON object.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_every_product_field() {
        for field in ["\"id\"", "\"title\"", "\"price\"", "\"url\"", "\"image\""] {
            assert!(INTENT_SYSTEM_PROMPT.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_prompt_carries_placeholder_and_empty_contract() {
        assert!(INTENT_SYSTEM_PROMPT.contains(PLACEHOLDER_IMAGE_URL));
        assert!(INTENT_SYSTEM_PROMPT.contains("{ \"products\": [] }"));
    }
}

#[cfg(test)]
mod tests {
    use crate::gateway::protocol::parse_rect_param;

    #[test]
    fn test_parse_rect_param() {
        let rect = parse_rect_param("0,0,2,3").unwrap();
        assert_eq!(rect.min().x, 0.0);
        assert_eq!(rect.min().y, 0.0);
        assert_eq!(rect.max().x, 2.0);
        assert_eq!(rect.max().y, 3.0);
    }

    #[test]
    fn test_parse_rect_param_accepts_floats_and_whitespace() {
        let rect = parse_rect_param(" -1.5, 0.25 ,3.75, 4 ").unwrap();
        assert_eq!(rect.min().x, -1.5);
        assert_eq!(rect.max().y, 4.0);
    }

    #[test]
    fn test_parse_rect_param_rejects_wrong_arity() {
        assert!(parse_rect_param("1,2,3").is_err());
        assert!(parse_rect_param("1,2,3,4,5").is_err());
        assert!(parse_rect_param("").is_err());
    }

    #[test]
    fn test_parse_rect_param_rejects_non_numeric() {
        assert!(parse_rect_param("a,b,c,d").is_err());
        assert!(parse_rect_param("1,2,3,x").is_err());
    }
}

use super::{Coercer, FieldTable};

macro_rules! field_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => ($canon:literal, $key:literal, $coercer:ident),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)+
        }

        impl FieldTable for $name {
            const ALL: &'static [Self] = &[$($name::$variant,)+];

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $canon,)+
                }
            }

            fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            fn coercer(self) -> Coercer {
                match self {
                    $($name::$variant => Coercer::$coercer,)+
                }
            }
        }
    };
}

field_table! {
    /// Fields of the light (JSON) snapshot. Keys are the feed's short codes.
    pub enum LightField {
        Change => ("change", "c", Text),
        ChangeStr => ("change_str", "ccol", Text),
        ChangePerc => ("change_perc", "cp", Float),
        Exchange => ("exchange", "e", Text),
        Id => ("id", "id", Int),
        Price => ("price", "l", Text),
        LastPrice => ("last_price", "l_cur", Raw),
        Date => ("date", "lt", Text),
        Time => ("time", "ltt", Text),
        S => ("s", "s", Int),
        Symbol => ("symbol", "t", Text),
    }
}

field_table! {
    /// Fields of the heavy (XML) snapshot. Keys are the `finance` child element names.
    pub enum HeavyField {
        Symbol => ("symbol", "symbol", Text),
        PrettySymbol => ("pretty_symbol", "pretty_symbol", Text),
        Company => ("company", "company", Text),
        Exchange => ("exchange", "exchange", Text),
        ExchangeTimezone => ("exchange_timezone", "exchange_timezone", Text),
        ExchangeUtcOffset => ("exchange_utc_offset", "exchange_utc_offset", Text),
        ExchangeClosing => ("exchange_closing", "exchange_closing", Text),
        Currency => ("currency", "currency", Text),
        Last => ("last", "last", Float),
        High => ("high", "high", Float),
        Low => ("low", "low", Float),
        Open => ("open", "open", Float),
        YClose => ("y_close", "y_close", Float),
        Change => ("change", "change", Float),
        PercChange => ("perc_change", "perc_change", Float),
        Volume => ("volume", "volume", Int),
        AvgVolume => ("avg_volume", "avg_volume", Int),
        MarketCap => ("market_cap", "market_cap", Float),
        Delay => ("delay", "delay", Text),
        TradeTimestamp => ("trade_timestamp", "trade_timestamp", Text),
        TradeDateUtc => ("trade_date_utc", "trade_date_utc", Text),
        TradeTimeUtc => ("trade_time_utc", "trade_time_utc", Text),
        CurrentDateUtc => ("current_date_utc", "current_date_utc", Text),
        CurrentTimeUtc => ("current_time_utc", "current_time_utc", Text),
        SymbolUrl => ("symbol_url", "symbol_url", Text),
        ChartUrl => ("chart_url", "chart_url", Text),
        DaylightSavings => ("daylight_savings", "daylight_savings", Text),
    }
}

field_table! {
    /// Fields of the CSV field query. Keys are the endpoint's format tags.
    pub enum CsvField {
        Ask => ("ask", "a", Float),
        AverageDailyVolume => ("average_daily_volume", "a2", Int),
        AskSize => ("ask_size", "a5", Int),
        Bid => ("bid", "b", Float),
        AskRealtime => ("ask_realtime", "b2", Float),
        BidRealtime => ("bid_realtime", "b3", Float),
        BookValue => ("book_value", "b4", Float),
        BidSize => ("bid_size", "b6", Int),
        ChangeAndPercent => ("change_and_percent", "c", Text),
        Change => ("change", "c1", Float),
        DividendShare => ("dividend_share", "d", Float),
        LastTradeDate => ("last_trade_date", "d1", Text),
        EarningsShare => ("earnings_share", "e", Float),
        EpsEstimateCurrentYear => ("eps_estimate_current_year", "e7", Float),
        EpsEstimateNextYear => ("eps_estimate_next_year", "e8", Float),
        EpsEstimateNextQuarter => ("eps_estimate_next_quarter", "e9", Float),
        DaysLow => ("days_low", "g", Float),
        DaysHigh => ("days_high", "h", Float),
        YearLow => ("year_low", "j", Float),
        YearHigh => ("year_high", "k", Float),
        MarketCap => ("market_cap", "j1", Text),
        LastTradeWithTime => ("last_trade_with_time", "l", Text),
        Price => ("price", "l1", Float),
        DaysRange => ("days_range", "m", Text),
        MovingAverage50 => ("moving_average_50", "m3", Float),
        MovingAverage200 => ("moving_average_200", "m4", Float),
        Name => ("name", "n", Text),
        Open => ("open", "o", Float),
        PreviousClose => ("previous_close", "p", Float),
        ChangePct => ("change_pct", "p2", Float),
        PriceSales => ("price_sales", "p5", Float),
        PriceBook => ("price_book", "p6", Float),
        ExDividendDate => ("ex_dividend_date", "q", Text),
        Pe => ("pe", "r", Float),
        DividendPayDate => ("dividend_pay_date", "r1", Text),
        Peg => ("peg", "r5", Float),
        Symbol => ("symbol", "s", Text),
        ShortRatio => ("short_ratio", "s7", Float),
        LastTradeTime => ("last_trade_time", "t1", Text),
        OneYearTarget => ("one_year_target", "t8", Float),
        Volume => ("volume", "v", Int),
        StockExchange => ("stock_exchange", "x", Text),
        DividendYield => ("dividend_yield", "y", Float),
        Status => ("status", "e1", Text),
    }
}

impl CsvField {
    /// Look a field up by canonical name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Fields requested when the caller names none.
    pub const DEFAULTS: &'static [CsvField] = &[
        CsvField::Symbol,
        CsvField::Price,
        CsvField::ChangePct,
        CsvField::Pe,
        CsvField::LastTradeTime,
        CsvField::ShortRatio,
    ];
}
